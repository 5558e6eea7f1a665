#[derive(Clone)]
pub struct DaemonConfig {
    pub bot_name: String,
    pub custom_port: Option<u16>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        DaemonConfig {
            bot_name: "Bot".to_owned(),
            custom_port: None,
        }
    }
}
