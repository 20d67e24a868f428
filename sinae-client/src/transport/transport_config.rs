use sinae_core::IceServerConfig;

/// STUN/TURN configuration handed to the peer transport. Path
/// discovery mechanics are the transport's business; this is just
/// configuration passed through.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![
                IceServerConfig::stun("stun:stun.l.google.com:19302"),
                IceServerConfig::turn("turn:relay1.expressturn.com:3478", "efree", "efree"),
            ],
        }
    }
}
