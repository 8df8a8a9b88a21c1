//! `autoping list-channels`: print every thread-capable channel with its id.

use {
    anyhow::Result,
    autoping_auto_reply::{ChannelLister, Grouping},
    autoping_config::AutoPingConfig,
    autoping_discord::ChannelListing,
    secrecy::ExposeSecret,
};

const RULE_WIDTH: usize = 70;

pub async fn handle_list_channels(config: &AutoPingConfig) -> Result<()> {
    eprintln!("🔄 Connecting to list channels...\n");
    let listing = autoping_discord::fetch_channel_listing(config.discord.token.expose_secret()).await?;
    println!("{}", render(&listing));
    Ok(())
}

fn render(listing: &ChannelListing) -> String {
    let rule = "═".repeat(RULE_WIDTH);
    let mut out = format!(
        "{rule}\n📋 THREAD-CAPABLE CHANNELS\n👤 Logged in as: {}\n{rule}\n",
        listing.user_tag
    );

    if listing.guild_count == 0 {
        out.push_str("\n⚠️ You are not in any server.\n");
        return out;
    }

    let lister = ChannelLister::unpaged().grouping(Grouping::WorkspaceAndCategory);
    let entries = lister.collect(listing.channels.iter().cloned());
    if entries.is_empty() {
        out.push_str("\n(No text, forum, media or announcement channels found)\n");
    } else {
        for page in lister.pages(&entries) {
            out.push_str(&page);
        }
    }

    out.push_str(&format!(
        "\n{rule}\n💡 TIP: copy the id of the channel you want into `.env`\n   \
         Set: CHANNEL_ID=<copied_id>\n{rule}\n"
    ));
    out
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        autoping_channels::{ChannelKind, ChannelSnapshot, PermissionCheck},
    };

    fn snapshot(id: &str, name: &str, category: Option<&str>, kind: ChannelKind) -> ChannelSnapshot {
        ChannelSnapshot {
            id: id.into(),
            name: name.into(),
            workspace_id: Some("900000000000000009".into()),
            workspace_name: Some("Loja".into()),
            category: category.map(String::from),
            kind,
            send_permission: PermissionCheck::Allowed,
        }
    }

    #[test]
    fn groups_by_server_and_category() {
        let listing = ChannelListing {
            user_tag: "me#0001".into(),
            guild_count: 1,
            channels: vec![
                snapshot("1", "pedidos", Some("Vendas"), ChannelKind::Forum),
                snapshot("2", "geral", None, ChannelKind::Text),
                snapshot("3", "voz", Some("Vendas"), ChannelKind::Other(2)),
            ],
        };
        let out = render(&listing);
        assert!(out.contains("👤 Logged in as: me#0001"));
        assert!(out.contains("🏠 Loja\n   Server ID: 900000000000000009"));
        assert!(out.contains("📁 Vendas\n      📋 #pedidos\n         ID: 1"));
        assert!(out.contains("📁 No category\n      💬 #geral"));
        assert!(!out.contains("#voz"));
        assert!(out.contains("CHANNEL_ID=<copied_id>"));
    }

    #[test]
    fn no_servers() {
        let listing = ChannelListing {
            user_tag: "me#0001".into(),
            guild_count: 0,
            channels: Vec::new(),
        };
        assert!(render(&listing).contains("not in any server"));
    }
}
