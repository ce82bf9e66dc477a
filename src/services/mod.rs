pub mod osrm;
pub mod vrp_solver;

pub use osrm::{HttpRoadService, OsrmConfig, RoadService, RoadServiceError, RouteResult, TableResult};
pub use vrp_solver::{SolverError, SubprocessVrpSolver, VrpProblem, VrpSolution, VrpSolver};
