use std::env;
use std::process::exit;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use dawn::commands::{Autocomplete, AutocompleteChoice, SlashCommand, SlashOption};
use dawn::extensions::Extension;
use dawn::{sync, State};
use serde_json::Value;
use serenity::client::{Context, EventHandler};
use serenity::model::prelude::interaction::{
    application_command::{ApplicationCommandInteraction, CommandDataOption},
    autocomplete::AutocompleteInteraction,
    Interaction, InteractionResponseType,
};
use serenity::model::prelude::Ready;
use serenity::prelude::{GatewayIntents, RwLock};
use serenity::{async_trait, Client};
use tracing::{debug, error, info, warn};

const COLORS: [&str; 6] = ["red", "orange", "yellow", "green", "blue", "purple"];

/// Suggest the colors starting with what the user typed
struct ColorSuggestions;

#[async_trait]
impl Autocomplete for ColorSuggestions {
    async fn complete(
        &self,
        _interaction: &AutocompleteInteraction,
        option: &CommandDataOption,
    ) -> Result<Vec<AutocompleteChoice>> {
        let typed = option
            .value
            .as_ref()
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_lowercase();
        Ok(COLORS
            .iter()
            .filter(|color| color.starts_with(&typed))
            .map(|&color| color.into())
            .collect())
    }
}

fn demo_extension() -> Extension {
    let mut colors = SlashCommand::new("colors", "Pick a color")
        .with_option(SlashOption::new("color", "Your favorite color").with_autocomplete(true));
    colors.autocomplete("color", ColorSuggestions);
    Extension::new("demo")
        .with_command(SlashCommand::new("ping", "Check the bot is still available"))
        .with_command(colors)
}

async fn state(ctx: &Context) -> Result<Arc<RwLock<State>>> {
    let data = ctx.data.read().await;
    data.get::<State>()
        .cloned()
        .context("State is missing from the client data")
}

async fn autocomplete(ctx: &Context, interaction: &AutocompleteInteraction) -> Result<()> {
    let state = state(ctx).await?;
    let state = state.read().await;
    let guild_id = interaction.guild_id.map(|id| id.0);
    let Some(command) = state.extensions.find_command(&interaction.data.name, guild_id) else {
        warn!("Autocomplete for unknown command {}", interaction.data.name);
        return Ok(());
    };
    let Some(choices) = command.complete(interaction).await? else {
        return Ok(());
    };
    debug!("Suggesting {} choices for {}", choices.len(), command.name());
    let choices = Value::Array(choices.iter().map(AutocompleteChoice::to_json).collect());
    interaction
        .create_autocomplete_response(&ctx.http, |r| r.set_choices(choices))
        .await
        .context("Failed to send autocomplete response")
}

async fn respond(ctx: &Context, command: &ApplicationCommandInteraction) -> Result<()> {
    let content = match command.data.name.as_str() {
        "ping" => "pong!".to_string(),
        "colors" => {
            let color = command
                .data
                .options
                .first()
                .and_then(|o| o.value.as_ref())
                .and_then(Value::as_str)
                .unwrap_or("nothing");
            format!("{} chose {color}", command.user.name)
        }
        name => format!("Unknown command {name}"),
    };
    command
        .create_interaction_response(&ctx.http, |r| {
            r.kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|d| d.content(content))
        })
        .await
        .context("Failed to write message")
}

struct Handler;

#[async_trait]
impl EventHandler for Handler {
    /// Handler for the `ready` event
    /// Push the local commands to discord if they changed
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);
        let state = match state(&ctx).await {
            Ok(s) => s,
            Err(e) => {
                error!("{e}");
                return;
            }
        };
        let state = state.read().await;
        if !state.config.sync_commands_on_ready {
            info!("Command sync is disabled");
            return;
        }
        match sync::apply(
            &ctx.http,
            state.extensions.commands(),
            state.config.delete_unknown_commands,
        )
        .await
        {
            Ok(report) => info!("Synced commands: {report}"),
            Err(e) => error!("Failed to sync commands: {e:?}"),
        }
    }

    /// Handler for the `interaction_create` event
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Autocomplete(ac) => {
                if let Err(e) = autocomplete(&ctx, &ac).await {
                    error!("Failed to autocomplete {}: {e:?}", ac.data.name);
                }
            }
            Interaction::ApplicationCommand(command) => {
                info!(
                    "Received '{}' command from {}",
                    command.data.name, command.user.name
                );
                if let Err(e) = respond(&ctx, &command).await {
                    error!("Failed to execute {} command: {e:?}", command.data.name);
                } else {
                    info!("Executed {} command successfully", command.data.name);
                }
            }
            _ => (),
        }
    }
}

#[tokio::main]
async fn main() {
    // Setup tracing
    let subscriber = tracing_subscriber::FmtSubscriber::new();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| eprintln!("Unable to set global default subscriber: {e}"))
        .ok();

    // Get the discord token from a .env file
    dotenv::dotenv().ok();
    let token = env::var("DISCORD_TOKEN").unwrap_or_else(|e| {
        error!("Expected a discord token in the .env file: {e}");
        exit(1);
    });
    info!("Found discord token in .env file");

    // Slash commands and autocomplete need no privileged intents
    let mut client = Client::builder(&token, GatewayIntents::empty())
        .event_handler(Handler)
        .await
        .unwrap_or_else(|e| {
            error!("Error creating client: {e}");
            exit(1);
        });
    info!("Client is setup");

    let mut state = match State::from_config_files() {
        Ok(s) => s,
        Err(e) => {
            error!("An error occurred while parsing your config files: {e:?}");
            exit(1);
        }
    };
    if let Err(e) = state.extensions.load(demo_extension()) {
        error!("Failed to load the demo extension: {e}");
        exit(1);
    }
    info!("Extensions loaded successfully");

    // Wrapped in a block to close the write lock before starting the client
    {
        let mut data = client.data.write().await;
        data.insert::<State>(Arc::new(RwLock::new(state)));
    }
    // Finally, start a single shard, and start listening to events.
    if let Err(err) = client.start().await {
        error!("Client error: {:?}", err);
        exit(1);
    }
}
