pub mod gas;
pub mod market;
pub mod order;
pub mod position;
pub mod price;
pub mod state;

pub use gas::*;
pub use market::*;
pub use order::*;
pub use position::*;
pub use price::*;
pub use state::*;
