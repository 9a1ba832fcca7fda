use std::{sync::LazyLock, time::Duration};

use reqwest::{Client, ClientBuilder};

/// 与 OneBot HTTP 接口通信的共享客户端，超时与 WebSocket 调用保持一致
pub static HTTP_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    ClientBuilder::new()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("failed to build http client")
});
