//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, DownloadVariant, OutputFormat};
use crate::client::{Client, Document, DocumentUploadOptions, ListOptions, Tag};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::hook::{PostConsume, PreConsume};
use crate::pagination::Cursor;
use crate::task::WaitPolicy;
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
    config: ClientConfig,
}

impl Runner {
    /// Create a runner for `cli` using the already resolved `config`
    pub fn new(cli: Cli, config: ClientConfig) -> Self {
        Self { cli, config }
    }

    /// Run the CLI command. Ctrl-C cancels the operation in progress.
    pub async fn run(&self) -> Result<()> {
        // Hook environments are read without talking to the server
        match &self.cli.command {
            Commands::PreConsume => return self.emit(&PreConsume::from_env()),
            Commands::PostConsume { fetch: false } => {
                return self.emit(&self.post_consume_env()?);
            }
            _ => {}
        }

        let client = self.config.build()?;

        debug!(
            url = %self.config.base_url,
            max_concurrent_requests = self.config.max_concurrent_requests,
            "Client configured"
        );

        let cancel = CancellationToken::new();
        let interrupt = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, cancelling");
                    cancel.cancel();
                }
            })
        };

        let result = self.dispatch(&client, &cancel).await;
        interrupt.abort();
        result
    }

    async fn dispatch(&self, client: &Client, cancel: &CancellationToken) -> Result<()> {
        match &self.cli.command {
            Commands::Ping => {
                client.ping(cancel).await?;
                self.emit(&json!({"status": "ok"}))
            }
            Commands::Tags {
                name,
                ordering,
                page_size,
            } => {
                self.tags(client, name.as_deref(), ordering.as_deref(), *page_size, cancel)
                    .await
            }
            Commands::Tasks => {
                for task in client.list_tasks(cancel).await? {
                    self.emit(&task)?;
                }
                Ok(())
            }
            Commands::WaitTask {
                task_id,
                max_elapsed,
            } => self.wait_task(client, task_id, *max_elapsed, cancel).await,
            Commands::Logs { name: None } => {
                for name in client.list_logs(cancel).await? {
                    self.emit(&name)?;
                }
                Ok(())
            }
            Commands::Logs { name: Some(name) } => {
                for entry in client.get_log(name, cancel).await? {
                    self.emit(&entry)?;
                }
                Ok(())
            }
            Commands::Status => self.emit(&client.get_status(cancel).await?),
            Commands::Whoami => self.emit(&client.get_current_user(cancel).await?),
            Commands::Upload {
                file,
                title,
                correspondent,
                document_type,
                tags,
                wait,
                max_elapsed,
            } => {
                let mut options = DocumentUploadOptions::default();
                options.title.clone_from(title);
                options.correspondent = *correspondent;
                options.document_type = *document_type;
                options.tags.clone_from(tags);

                let upload = client.upload_document_file(file, options, cancel).await?;
                info!(task_id = %upload.task_id, "Upload accepted");

                if *wait {
                    self.wait_task(client, &upload.task_id, *max_elapsed, cancel)
                        .await
                } else {
                    self.emit(&upload)
                }
            }
            Commands::Download {
                id,
                output,
                variant,
            } => self.download(client, *id, output, *variant, cancel).await,
            Commands::PostConsume { .. } => {
                let hook = self.post_consume_env()?;
                let document: Document = client
                    .get(&Document::resource(), hook.document_id, cancel)
                    .await?;
                self.emit(&json!({"hook": hook, "document": document}))
            }
            Commands::PreConsume => self.emit(&PreConsume::from_env()),
        }
    }

    /// Post-consume environment, with offset-less times in the server timezone
    fn post_consume_env(&self) -> Result<PostConsume> {
        PostConsume::from_lookup(|name| std::env::var(name).ok(), self.config.timezone()?)
    }

    async fn tags(
        &self,
        client: &Client,
        name: Option<&str>,
        ordering: Option<&str>,
        page_size: Option<u64>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let mut options = ListOptions::new();
        if let Some(name) = name {
            options = options.name_contains(name);
        }
        if let Some(ordering) = ordering {
            options = options.ordering(ordering);
        }
        if let Some(size) = page_size {
            options = options.page(Cursor::with_size(size));
        }

        client
            .list_all(&Tag::resource(), &options, cancel, |tag: Tag| {
                let emitted = self.emit(&tag);
                async move { emitted }
            })
            .await
    }

    async fn wait_task(
        &self,
        client: &Client,
        task_id: &str,
        max_elapsed: Option<u64>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let mut policy = WaitPolicy::new();
        if let Some(seconds) = max_elapsed {
            policy = policy.max_elapsed(Duration::from_secs(seconds));
        }

        match client.wait_for_task(task_id, policy, cancel).await {
            Ok(task) => self.emit(&task),
            Err(e) => {
                if let Error::TaskFailed { task, .. } = &e {
                    self.emit(&**task)?;
                }
                Err(e)
            }
        }
    }

    async fn download(
        &self,
        client: &Client,
        id: i64,
        output: &Path,
        variant: DownloadVariant,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let mut file = tokio::fs::File::create(output).await?;

        let result = match variant {
            DownloadVariant::Original => client.download_original(id, &mut file, cancel).await,
            DownloadVariant::Archived => client.download_archived(id, &mut file, cancel).await,
            DownloadVariant::Thumbnail => client.download_thumbnail(id, &mut file, cancel).await,
        };

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                drop(file);
                // Leave no partial file behind
                if let Err(remove) = tokio::fs::remove_file(output).await {
                    warn!(path = %output.display(), error = %remove, "Removing partial download failed");
                }
                return Err(e);
            }
        };

        file.sync_all().await?;
        file.shutdown().await?;

        self.emit(&result)
    }

    fn emit<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let line = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        println!("{line}");
        Ok(())
    }
}
