pub mod apparatus;
pub mod clinical_history;
pub mod enums;
pub mod patient;
pub mod shapes;
pub mod visit;

pub use apparatus::*;
pub use clinical_history::*;
pub use patient::*;
pub use shapes::*;
pub use visit::*;
