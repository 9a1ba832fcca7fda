pub(crate) mod command;
mod identity;
mod render;
mod service;

use std::sync::Arc;

use anyhow::Result;
use onebot::{
    chain::{Context, Rule},
    plugin::Plugin,
};

pub use identity::{HttpLookup, IdentityLookup};
pub use render::Renderer;

use crate::{
    plugin::drift_bottle::{
        command::{Command, CommandMatcher},
        identity::CallerLookup,
        service::{BottleService, GroupRef, Invocation, UserRef},
    },
    store::BottleStore,
};

const UNKNOWN_NAME: &str = "未知";

pub struct DriftBottle {
    store: Arc<BottleStore>,
    matcher: CommandMatcher,
    renderer: Renderer,
    /// 为 `None` 时通过触发事件的连接查询
    lookup: Option<Arc<dyn IdentityLookup>>,
}

impl DriftBottle {
    pub fn new(
        store: Arc<BottleStore>,
        matcher: CommandMatcher,
        renderer: Renderer,
        lookup: Option<Arc<dyn IdentityLookup>>,
    ) -> Self {
        Self {
            store,
            matcher,
            renderer,
            lookup,
        }
    }

    async fn handle(&self, ctx: &Context) -> Result<bool> {
        let Some(command) = self.matcher.classify(&ctx.event.plain_text()) else {
            return Ok(false);
        };
        let lookup: Arc<dyn IdentityLookup> = match &self.lookup {
            Some(lookup) => lookup.clone(),
            None => Arc::new(CallerLookup::new(ctx.caller.clone())),
        };
        let invocation = invocation(ctx, lookup.as_ref()).await?;
        let service = BottleService::new(self.store.clone(), lookup);
        let outcome = match command {
            Command::Throw { content } => service.throw(&invocation, content).await?,
            Command::Pick => service.pick(&invocation).await?,
        };
        ctx.reply(self.renderer.render(&outcome)).await?;
        Ok(true)
    }
}

/// 群名称只用于记录与日志，查询失败时使用占位名称
async fn invocation(ctx: &Context, lookup: &dyn IdentityLookup) -> Result<Invocation> {
    let user = UserRef {
        id: ctx.event.try_user_id()?,
        name: ctx.event.display_name(),
    };
    let group = match ctx.event.try_group_id() {
        Err(_) => None,
        Ok(group_id) => {
            let name = lookup.group_name(group_id).await.unwrap_or_else(|e| {
                debug!(group_id, "Failed to resolve group name: {e:?}");
                UNKNOWN_NAME.to_owned()
            });
            Some(GroupRef { id: group_id, name })
        }
    };
    Ok(Invocation { user, group })
}

pub fn drift_bottle_plugin(drift_bottle: DriftBottle) -> Plugin {
    let mut plugin = Plugin::new("漂流瓶插件", "扔一个漂流瓶到大海中，或者从大海中捡一个漂流瓶");
    let drift_bottle = Arc::new(drift_bottle);
    let rule_drift_bottle = drift_bottle.clone();

    plugin.on(
        "扔漂流瓶 / 捡漂流瓶",
        i32::default(),
        Rule::on_message() & Rule::on_text("drift_bottle", move |text| rule_drift_bottle.matcher.is_command(text)),
        move |ctx| {
            let drift_bottle = drift_bottle.clone();
            async move { drift_bottle.handle(&ctx).await }
        },
    );

    plugin
}
