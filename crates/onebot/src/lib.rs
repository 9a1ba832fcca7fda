//! OneBot 11 协议客户端：正向 WebSocket 适配器、事件与接口定义、规则链与插件

#[macro_use]
extern crate tracing;

pub mod adapter;
pub mod bot;
pub mod caller;
pub mod chain;
pub mod error;
pub mod plugin;
pub mod schema;
