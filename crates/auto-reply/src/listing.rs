//! Channel enumeration and message-sized pagination.

use autoping_channels::{ChannelKind, ChannelSnapshot};

/// Discord caps messages at 2000 characters; keep headroom for fences.
const MAX_PAGE_CHARS: usize = 1900;

const FIRST_PAGE_HEADER: &str = "📋 **Available channels:**\n";
const FENCE: &str = "```";
const NO_CATEGORY: &str = "No category";
const UNKNOWN_WORKSPACE: &str = "unknown server";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    /// One header per workspace.
    Workspace,
    /// Workspace headers, then one sub-header per category.
    WorkspaceAndCategory,
}

/// One listable channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEntry {
    pub id: String,
    pub name: String,
    pub workspace: String,
    pub workspace_id: Option<String>,
    pub category: Option<String>,
    pub kind: ChannelKind,
}

impl From<ChannelSnapshot> for ChannelEntry {
    fn from(channel: ChannelSnapshot) -> Self {
        Self {
            id: channel.id,
            name: channel.name,
            workspace: channel
                .workspace_name
                .unwrap_or_else(|| UNKNOWN_WORKSPACE.to_string()),
            workspace_id: channel.workspace_id,
            category: channel.category,
            kind: channel.kind,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChannelLister {
    max_per_page: usize,
    max_page_chars: usize,
    grouping: Grouping,
    fenced: bool,
    footer: Option<String>,
}

impl ChannelLister {
    /// Chat-sized pages: fenced, grouped by workspace, at most
    /// `max_per_page` channels each.
    pub fn new(max_per_page: usize) -> Self {
        Self {
            max_per_page: max_per_page.max(1),
            max_page_chars: MAX_PAGE_CHARS,
            grouping: Grouping::Workspace,
            fenced: true,
            footer: None,
        }
    }

    /// A single unbounded page without chat heading or code fences, for
    /// terminal output.
    pub fn unpaged() -> Self {
        Self {
            max_per_page: usize::MAX,
            max_page_chars: usize::MAX,
            grouping: Grouping::Workspace,
            fenced: false,
            footer: None,
        }
    }

    #[must_use]
    pub fn grouping(mut self, grouping: Grouping) -> Self {
        self.grouping = grouping;
        self
    }

    /// Text appended after the last page.
    #[must_use]
    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Keep only thread-capable channels, ordered by workspace, category
    /// and name.
    pub fn collect(&self, channels: impl IntoIterator<Item = ChannelSnapshot>) -> Vec<ChannelEntry> {
        let mut entries: Vec<ChannelEntry> = channels
            .into_iter()
            .filter(|c| c.kind.supports_threads())
            .map(ChannelEntry::from)
            .collect();
        entries.sort_by(|a, b| {
            (&a.workspace, a.category.is_none(), &a.category, &a.name).cmp(&(
                &b.workspace,
                b.category.is_none(),
                &b.category,
                &b.name,
            ))
        });
        entries
    }

    /// Lazily render `entries` into pages. Yields nothing for an empty slice.
    pub fn pages<'a>(&'a self, entries: &'a [ChannelEntry]) -> ChannelPages<'a> {
        ChannelPages {
            lister: self,
            entries,
            pos: 0,
        }
    }

    fn line(&self, entry: &ChannelEntry) -> String {
        match self.grouping {
            Grouping::Workspace => format!(
                "   {} #{}\n      ID: {}\n",
                entry.kind.icon(),
                entry.name,
                entry.id
            ),
            Grouping::WorkspaceAndCategory => format!(
                "      {} #{}\n         ID: {}\n",
                entry.kind.icon(),
                entry.name,
                entry.id
            ),
        }
    }

    fn workspace_header(&self, entry: &ChannelEntry) -> String {
        match (self.grouping, &entry.workspace_id) {
            (Grouping::WorkspaceAndCategory, Some(id)) => {
                format!("\n🏠 {}\n   Server ID: {id}\n", entry.workspace)
            },
            _ => format!("\n🏠 {}\n", entry.workspace),
        }
    }

    /// Characters reserved at the end of every page.
    fn tail_reserve(&self) -> usize {
        let fence = if self.fenced {
            FENCE.chars().count()
        } else {
            0
        };
        let footer = self
            .footer
            .as_ref()
            .map_or(0, |f| f.chars().count() + 1);
        fence + footer
    }
}

/// Iterator over rendered pages. Group headers repeat at the top of each
/// continuation page.
pub struct ChannelPages<'a> {
    lister: &'a ChannelLister,
    entries: &'a [ChannelEntry],
    pos: usize,
}

impl Iterator for ChannelPages<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.pos >= self.entries.len() {
            return None;
        }

        let lister = self.lister;
        let mut page = String::new();
        if lister.fenced {
            if self.pos == 0 {
                page.push_str(FIRST_PAGE_HEADER);
            }
            page.push_str(FENCE);
            page.push('\n');
        }
        let mut page_chars = page.chars().count();
        let budget = lister.max_page_chars.saturating_sub(lister.tail_reserve());

        let mut workspace: Option<&str> = None;
        let mut category: Option<Option<&str>> = None;
        let mut count = 0;

        while let Some(entry) = self.entries.get(self.pos) {
            let mut block = String::new();
            if workspace != Some(entry.workspace.as_str()) {
                block.push_str(&lister.workspace_header(entry));
                category = None;
            }
            if lister.grouping == Grouping::WorkspaceAndCategory
                && category != Some(entry.category.as_deref())
            {
                block.push_str(&format!(
                    "\n   📁 {}\n",
                    entry.category.as_deref().unwrap_or(NO_CATEGORY)
                ));
            }
            block.push_str(&lister.line(entry));

            let block_chars = block.chars().count();
            if count > 0 && (count >= lister.max_per_page || page_chars + block_chars > budget) {
                break;
            }

            page.push_str(&block);
            page_chars += block_chars;
            workspace = Some(entry.workspace.as_str());
            category = Some(entry.category.as_deref());
            count += 1;
            self.pos += 1;
        }

        if lister.fenced {
            page.push_str(FENCE);
        }
        if self.pos >= self.entries.len()
            && let Some(footer) = &lister.footer
        {
            page.push('\n');
            page.push_str(footer);
        }
        Some(page)
    }
}
