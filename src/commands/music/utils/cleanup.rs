use poise::{CreateReply, serenity_prelude as serenity};
use serenity::model::id::{ChannelId, MessageId};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::{CommandResult, Context};

/// Deletes a message after `delay`. A message that is already gone is ignored.
pub fn schedule_delete(
    http: Arc<serenity::Http>,
    channel_id: ChannelId,
    message_id: MessageId,
    delay: Duration,
) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if let Err(e) = channel_id.delete_message(&http, message_id).await {
            debug!("Auto-delete of message {} skipped: {}", message_id, e);
        }
    });
}

/// Sends `reply` and, when auto-deletion is on, schedules it and the
/// invoking prefix message for deletion.
pub async fn reply_and_cleanup(ctx: Context<'_>, reply: CreateReply) -> CommandResult {
    let handle = ctx.send(reply).await?;

    let Some(delay) = ctx.data().config.auto_delete_delay() else {
        return Ok(());
    };
    let http = ctx.serenity_context().http.clone();

    match handle.message().await {
        Ok(message) => schedule_delete(http.clone(), message.channel_id, message.id, delay),
        Err(e) => debug!("Reply cannot be auto-deleted: {}", e),
    }

    if let poise::Context::Prefix(prefix) = ctx {
        schedule_delete(http, prefix.msg.channel_id, prefix.msg.id, delay);
    }
    Ok(())
}
