//! Outbound HTTP integrations.

pub mod upstream_client {
    pub use crate::upstream_client::*;
}

pub mod keep_alive {
    pub use crate::keep_alive::*;
}
