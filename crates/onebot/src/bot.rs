use std::{borrow::Cow, future::Future};

use anyhow::Result;

use crate::{
    adapter::{self, Adapter},
    chain::{Context, Matcher, Rule},
    plugin::Plugin,
};

pub struct Bot {
    adapter: Box<dyn Adapter>,
    plugins: Vec<Plugin>,
}

impl Bot {
    pub async fn connect(address: &str) -> Result<Self> {
        Ok(Bot {
            adapter: adapter::WsAdapter::connect(address).await?,
            plugins: vec![Plugin::new("内建插件", "直接注册在 Bot 上的插件")],
        })
    }

    pub fn on<D, M, H, Fut>(&mut self, description: D, priority: i32, matcher: M, handler: H)
    where
        D: Into<Cow<'static, str>>,
        M: Into<Matcher>,
        H: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool>> + Send + 'static,
    {
        self.plugins[0].on(description, priority, matcher, handler);
    }

    pub fn register_plugin(&mut self, plugin: Plugin) {
        info!(plugin = %plugin.name, "Plugin registered");
        self.plugins.push(plugin);
    }

    pub async fn start(self) -> Result<()> {
        info!("Bot started");
        self.adapter.spawn(self.plugins).await
    }

    pub fn use_builtin_handler(&mut self) {
        self.on(
            "显示帮助信息",
            i32::MAX,
            Rule::on_message() & Rule::on_exact_match("#help"),
            |ctx| async move {
                ctx.reply(help_message(&ctx.plugins)).await?;
                Ok(true)
            },
        );
    }
}

fn help_message(plugins: &[Plugin]) -> String {
    let mut help_message = String::from("由 Rust 与 Tokio 驱动的漂流瓶机器人！目前由如下插件提供服务：\n");
    for plugin in plugins {
        help_message.push_str(&format!("\n  {} - {}\n", plugin.name, plugin.description));
        for (matcher, description) in plugin.commands() {
            help_message.push_str(&format!("    {matcher} - {description}\n"));
        }
    }
    help_message
}
