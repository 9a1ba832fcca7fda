mod handler;
mod matcher;
mod rule;
use std::borrow::Cow;

pub use handler::{Context, Handler};
pub use matcher::Matcher;
pub use rule::Rule;

/// 插件中注册的一条规则，启动时与其它插件的规则一起按优先级排序
pub struct MatchUnion {
    pub plugin: Cow<'static, str>,
    pub description: Cow<'static, str>,
    pub priority: i32,
    pub matcher: Matcher,
    pub handler: Handler,
}

impl MatchUnion {
    /// 匹配并执行处理函数，返回是否中断后续处理；处理出错时只记录日志
    pub async fn run(&self, context: Context) -> bool {
        if !self.matcher.is_match(&context.event) {
            return false;
        }
        match (self.handler)(context).await {
            Ok(consumed) => consumed,
            Err(e) => {
                error!(plugin = %self.plugin, handler = %self.description, "Failed to handle event: {e:?}");
                false
            }
        }
    }
}
