// Result is a typedef of std `Result` with the error type our own `Error`.
// ResultExt adds the `chain_err` trait method.
use error_chain::*;

error_chain! {
    errors {
        InvalidDimension(width: usize, height: usize) {
            description("grid width and height must be positive")
            display("invalid grid dimensions {}x{}: width and height must be positive", width, height)
        }

        OutOfBounds(x: i64, y: i64) {
            description("coordinate outside the grid")
            display("coordinate ({}, {}) is outside the grid", x, y)
        }

        NotInitialized {
            description("grid has no cells")
            display("grid has not been initialized")
        }

        MissingEndpoint {
            description("path endpoint not set")
            display("both a start and an end cell are required to find a path")
        }

        CellNotVisited(x: u32, y: u32) {
            description("cell not reached by maze generation")
            display("cell ({}, {}) has not been visited by maze generation", x, y)
        }
    }
}
