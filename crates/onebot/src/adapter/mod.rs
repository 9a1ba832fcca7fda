use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
mod ws;

pub use ws::WsAdapter;

use crate::{chain::MatchUnion, plugin::Plugin, schema::*};

#[async_trait]
pub trait Connector: Send + Sync {
    async fn spawn(mut self: Box<Self>, plugins: Vec<Plugin>) -> Result<()>;
}

#[async_trait]
pub trait Caller: Send + Sync {
    async fn call(&self, request: ApiRequest) -> Result<ApiResponse>;
    async fn send_msg(&self, param: SendMsgParams) -> Result<SendMsgResult>;
    async fn get_stranger_info(&self, param: GetStrangerInfoParams) -> Result<GetStrangerInfoResult>;
    async fn get_group_info(&self, param: GetGroupInfoParams) -> Result<GetGroupInfoResult>;
}

#[async_trait]
pub trait Adapter: Connector + Caller {}

pub(crate) fn extract_match_unions(plugins: &[Plugin]) -> Vec<Arc<MatchUnion>> {
    // 处理时不按插件分割，而是统一按照优先级从大到小排序，排序提前到启动时完成
    let mut match_unions = plugins
        .iter()
        .flat_map(|plugin| plugin.match_unions())
        .cloned()
        .collect::<Vec<_>>();
    match_unions.sort_by(|a, b| b.priority.cmp(&a.priority));
    match_unions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Rule;

    #[test]
    fn test_extract_match_unions() {
        let mut low = Plugin::new("low", "");
        low.on("low", i32::MIN, Rule::on_message(), |_| async { Ok(false) });
        let mut high = Plugin::new("high", "");
        high.on("default", 0, Rule::on_message(), |_| async { Ok(false) });
        high.on("high", i32::MAX, Rule::on_message(), |_| async { Ok(true) });
        let descriptions = extract_match_unions(&[low, high])
            .iter()
            .map(|mu| mu.description.to_string())
            .collect::<Vec<_>>();
        assert_eq!(descriptions, ["high", "default", "low"]);
    }
}
