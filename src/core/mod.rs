// Domain-layer modules and shared errors/models
pub mod consolidator {
    pub use crate::consolidator::*;
}

pub mod health {
    pub use crate::health::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod services {
    pub use crate::services::*;
}

pub mod errors {
    pub use crate::errors::*;
}
