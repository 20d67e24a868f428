mod rendezvous;
mod ws_channel;

pub use rendezvous::{ChannelEvent, ReconnectPolicy, RendezvousChannel};
pub use ws_channel::WsChannel;
