//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{ClientConfig, BASE_URL_ENV};
use crate::context::Context;
use crate::dispatch::{Api, Listing};
use crate::error::{ignore_not_found, Error, Result, ResultExt};
use crate::object::DynamicResource;
use crate::options::{CreateOptions, DestroyOptions, GetOptions, ListOptions, UpdateOptions};
use crate::pagination::PageIter;
use crate::stream::ObjectChannel;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, info_span, warn};

/// Page size when only `--page` is given
const DEFAULT_PAGE_LIMIT: u64 = 50;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

/// Arguments of the `list` command
struct ListArgs<'a> {
    path: &'a str,
    page: Option<u64>,
    limit: Option<u64>,
    max_pages: Option<u64>,
    stream: bool,
    full: bool,
    unpaged: bool,
    filters: &'a [(String, String)],
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let api = Api::from_config(&self.client_config()?)?;
        let ctx = Context::background().with_span(info_span!("resource_dispatch"));

        match &self.cli.command {
            Commands::Get { path, id } => self.get(&api, &ctx, path, id).await,
            Commands::Create { path, data } => self.create(&api, &ctx, path, data).await,
            Commands::Update { path, id, data } => self.update(&api, &ctx, path, id, data).await,
            Commands::Destroy {
                path,
                id,
                ignore_missing,
            } => self.destroy(&api, &ctx, path, id, *ignore_missing).await,
            Commands::List {
                path,
                page,
                limit,
                max_pages,
                stream,
                full,
                unpaged,
                filters,
            } => {
                let args = ListArgs {
                    path,
                    page: *page,
                    limit: *limit,
                    max_pages: *max_pages,
                    stream: *stream,
                    full: *full,
                    unpaged: *unpaged,
                    filters,
                };
                self.list(&api, &ctx, &args).await
            }
        }
    }

    /// Resolve the client config: file, then environment, then flags
    fn client_config(&self) -> Result<ClientConfig> {
        let config = match &self.cli.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::new(""),
        };
        let mut config = config.with_env_overrides();
        if let Some(base_url) = &self.cli.base_url {
            config.base_url.clone_from(base_url);
        }

        if config.base_url.trim().is_empty() {
            return Err(Error::config(format!(
                "No base URL (use --base-url, --config or {BASE_URL_ENV})"
            )));
        }
        config.validate()?;
        Ok(config)
    }

    async fn get(&self, api: &Api, ctx: &Context, path: &str, id: &str) -> Result<()> {
        let mut resource = DynamicResource::new(path).with_identifier(id);
        api.get(ctx, &mut resource, GetOptions::new()).await?;
        self.output_resource(&resource);
        Ok(())
    }

    async fn create(&self, api: &Api, ctx: &Context, path: &str, data: &str) -> Result<()> {
        let mut resource = DynamicResource::new(path).with_attributes(parse_data(data)?)?;
        api.create(ctx, &mut resource, CreateOptions::new()).await?;
        self.output_resource(&resource);
        Ok(())
    }

    async fn update(
        &self,
        api: &Api,
        ctx: &Context,
        path: &str,
        id: &str,
        data: &str,
    ) -> Result<()> {
        let mut resource = DynamicResource::new(path)
            .with_identifier(id)
            .with_attributes(parse_data(data)?)?;
        api.update(ctx, &mut resource, UpdateOptions::new()).await?;
        self.output_resource(&resource);
        Ok(())
    }

    async fn destroy(
        &self,
        api: &Api,
        ctx: &Context,
        path: &str,
        id: &str,
        ignore_missing: bool,
    ) -> Result<()> {
        let mut resource = DynamicResource::new(path).with_identifier(id);
        let result = api
            .destroy(ctx, &mut resource, DestroyOptions::new())
            .await;
        if ignore_missing {
            ignore_not_found(result)?;
        } else {
            result?;
        }

        self.output_message(&json!({"destroyed": id}));
        Ok(())
    }

    async fn list(&self, api: &Api, ctx: &Context, args: &ListArgs<'_>) -> Result<()> {
        let mut filter = DynamicResource::new(args.path);
        for (key, value) in args.filters {
            filter = filter.with_filter(key, value);
        }
        if args.unpaged {
            filter = filter.unpaged();
        }

        let mut options = ListOptions::new().full_objects(args.full);
        if args.stream {
            options = options.object_channel();
        } else if args.page.is_some() || args.limit.is_some() {
            options = options.paged(
                args.page.unwrap_or(1),
                args.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
            );
        }

        match api.list(ctx, &filter, options).await? {
            Listing::Pages(pages) => self.print_pages(pages, args.max_pages).await,
            Listing::Channel(objects) => self.print_channel(objects, &filter).await,
        }
    }

    /// Print every page, retrying retryable failures while the cursor allows
    async fn print_pages(
        &self,
        mut pages: PageIter<DynamicResource>,
        max_pages: Option<u64>,
    ) -> Result<()> {
        let mut delivered = 0;
        loop {
            let mut items = Vec::new();
            if pages.next(&mut items).await {
                for item in &items {
                    self.output_resource(item);
                }
                delivered += 1;
                if max_pages.is_some_and(|max| delivered >= max) {
                    break;
                }
                continue;
            }

            let retryable = pages.error().is_some_and(Error::is_retryable);
            if retryable && pages.reset_error() {
                let retries = u64::from(pages.state().retries);
                warn!(retries, "Retrying page {}", pages.current_page() + 1);
                tokio::time::sleep(Duration::from_millis(250 * retries)).await;
                continue;
            }
            if let Some(error) = pages.take_error() {
                return Err(error);
            }
            break;
        }

        info!(
            pages = delivered,
            items = pages.state().total_fetched,
            total_items = pages.total_items(),
            "List complete"
        );
        Ok(())
    }

    async fn print_channel(
        &self,
        mut objects: ObjectChannel<DynamicResource>,
        template: &DynamicResource,
    ) -> Result<()> {
        let mut count: u64 = 0;
        while let Some(retriever) = objects.recv().await {
            let mut item = template.clone();
            retriever.retrieve(&mut item).await?;
            self.output_resource(&item);
            count += 1;
        }
        objects.finish().await?;

        info!(items = count, "List complete");
        Ok(())
    }

    fn output_resource(&self, resource: &DynamicResource) {
        self.output_message(&Value::Object(resource.attributes().clone()));
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Parse `--data` as a JSON value
fn parse_data(data: &str) -> Result<Value> {
    serde_json::from_str::<Value>(data).context("--data is not valid JSON")
}
