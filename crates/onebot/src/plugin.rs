use std::{borrow::Cow, future::Future, sync::Arc};

use anyhow::Result;

use crate::chain::{Context, MatchUnion, Matcher};

/// 一组相关处理规则的集合，名称与描述用于帮助信息
pub struct Plugin {
    pub name: Cow<'static, str>,
    pub description: Cow<'static, str>,
    match_unions: Vec<Arc<MatchUnion>>,
}

impl Plugin {
    pub fn new(name: impl Into<Cow<'static, str>>, description: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            match_unions: Vec::new(),
        }
    }

    /// 注册处理函数，返回 `Ok(true)` 表示事件已被消费，不再交给优先级更低的处理函数
    pub fn on<D, M, H, Fut>(&mut self, description: D, priority: i32, matcher: M, handler: H)
    where
        D: Into<Cow<'static, str>>,
        M: Into<Matcher>,
        H: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool>> + Send + 'static,
    {
        self.match_unions.push(Arc::new(MatchUnion {
            plugin: self.name.clone(),
            description: description.into(),
            priority,
            matcher: matcher.into(),
            handler: Box::new(move |ctx| Box::pin(handler(ctx))),
        }));
    }

    /// 每条规则的匹配条件与描述
    pub fn commands(&self) -> impl Iterator<Item = (String, &str)> {
        self.match_unions
            .iter()
            .map(|mu| (mu.matcher.to_string(), mu.description.as_ref()))
    }

    pub(crate) fn match_unions(&self) -> &[Arc<MatchUnion>] {
        &self.match_unions
    }
}
