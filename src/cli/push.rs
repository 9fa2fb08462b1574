use clap::Parser;

#[derive(Parser)]
pub struct PushCommand {
    /// File holding the JSON push payload. Reads stdin when omitted
    #[clap()]
    pub payload: Option<String>,
}

#[derive(Parser)]
pub struct SyncCommand {
    /// Sync tag registered by the page, e.g. contact-form
    #[clap()]
    pub tag: String,
}

pub struct PushOptions {
    pub payload_path: Option<String>,
}

impl From<PushCommand> for PushOptions {
    fn from(options: PushCommand) -> Self {
        PushOptions {
            payload_path: options.payload,
        }
    }
}
