//! Notification commands: list, mark read, remove, and a live watch.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use shopfront_realtime::{
    ChannelConfig, Notification, NotificationApi, NotificationChannel, NotificationFeed,
};
use tracing::{info, warn};

use super::{explain, Session};

fn feed(session: &Session, size: Option<u32>) -> Arc<NotificationFeed> {
    let api = NotificationApi::new(session.gateway.clone(), &session.service.notifications);
    let size = size.unwrap_or(session.service.notifications.page_size);
    Arc::new(NotificationFeed::new(Arc::new(api), size))
}

fn print_row(item: &Notification) {
    let marker = if item.is_read { " " } else { "*" };
    println!(
        "{:1} {:>6} {:20} {:24} {}",
        marker,
        item.id,
        item.kind,
        item.created_at,
        item.title
    );
}

fn print_summary(feed: &NotificationFeed) {
    let cursor = feed.cursor();
    println!(
        "{} unread, {} of {} loaded",
        feed.unread_count(),
        cursor.loaded,
        cursor.total
    );
}

/// List the first `pages` pages, newest first.
pub async fn list(
    pages: u32,
    size: Option<u32>,
    output_json: bool,
    client_config_path: &Path,
) -> Result<()> {
    let session = Session::open(client_config_path)?;
    let feed = feed(&session, size);

    feed.reload().await.map_err(explain)?;
    for _ in 1..pages {
        if !feed.load_more().await.map_err(explain)? {
            break;
        }
    }

    if output_json {
        println!("{}", serde_json::to_string_pretty(&feed.items())?);
        return Ok(());
    }
    println!("{:1} {:>6} {:20} {:24} {}", "", "ID", "TYPE", "CREATED", "TITLE");
    for item in feed.items() {
        print_row(&item);
    }
    print_summary(&feed);
    Ok(())
}

pub async fn mark_read(ids: &[i64], client_config_path: &Path) -> Result<()> {
    let session = Session::open(client_config_path)?;
    let feed = feed(&session, None);
    for id in ids {
        feed.mark_read(*id).await?;
    }
    println!("Marked {} notification(s) read.", ids.len());
    Ok(())
}

pub async fn mark_all_read(client_config_path: &Path) -> Result<()> {
    let session = Session::open(client_config_path)?;
    feed(&session, None).mark_all_read().await?;
    println!("Marked all notifications read.");
    Ok(())
}

pub async fn remove(ids: &[i64], client_config_path: &Path) -> Result<()> {
    let session = Session::open(client_config_path)?;
    feed(&session, None).remove(ids).await?;
    println!("Removed {} notification(s).", ids.len());
    Ok(())
}

/// Print the current feed, then stream new notifications until Ctrl-C.
pub async fn watch(admin: bool, client_config_path: &Path) -> Result<()> {
    let session = Session::open(client_config_path)?;
    let feed = feed(&session, None);

    feed.reload().await.map_err(explain)?;
    for item in feed.items() {
        print_row(&item);
    }
    print_summary(&feed);

    let realtime = &session.service.realtime;
    let topic = if admin {
        realtime.admin_topic.clone()
    } else {
        realtime.user_topic.clone()
    };
    let config = ChannelConfig::from_service(&session.service, vec![topic])?;
    let channel = NotificationChannel::new(config, session.credentials.clone());

    {
        let feed = feed.clone();
        channel
            .on_message(move |topic, item| {
                info!(topic, id = item.id, "notification");
                print_row(&item);
                feed.push(item);
                print_summary(&feed);
            })
            .on_connect(|| println!("-- live"))
            .on_close(|| println!("-- disconnected, retrying"))
            .on_error(|e| warn!(error = %e, "realtime channel error"));
    }

    channel.connect();
    tokio::signal::ctrl_c().await?;
    channel.disconnect().await;
    println!();
    print_summary(&feed);
    Ok(())
}
