//! Batcher for bounding extraction payloads
//!
//! Stubs are partitioned once, before dispatch, into groups of at most
//! `items_per_batch`. A group also closes early when its estimated token count
//! would pass `max_tokens`, but never holds fewer than one stub.

use crate::state::ItemStub;

/// An ordered, size-bounded group of stubs sent in one extraction call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Submission position of this batch
    pub index: usize,

    /// Stubs in discovery order
    pub items: Vec<ItemStub>,
}

impl Batch {
    /// Number of stubs in the batch
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Renders the batch as one composite HTML document
    ///
    /// Each stub is wrapped in a container tagged with its id, holding a summary
    /// section and a detail section. A stub without detail HTML gets an empty
    /// detail section.
    pub fn document(&self) -> String {
        let mut doc = String::from("<html><body>\n");
        for stub in &self.items {
            doc.push_str(&render_item(stub));
        }
        doc.push_str("</body></html>\n");
        doc
    }
}

/// Partitions stubs into batches
///
/// # Arguments
///
/// * `stubs` - Enriched stubs in discovery order
/// * `items_per_batch` - Maximum stubs per batch (values below 1 act as 1)
/// * `max_tokens` - Estimated token ceiling per composite document
pub fn build_batches(stubs: Vec<ItemStub>, items_per_batch: usize, max_tokens: usize) -> Vec<Batch> {
    let items_per_batch = items_per_batch.max(1);
    let mut batches: Vec<Batch> = Vec::new();
    let mut current: Vec<ItemStub> = Vec::new();
    let mut current_tokens = 0;

    for stub in stubs {
        let tokens = estimate_tokens(&render_item(&stub));

        if !current.is_empty()
            && (current.len() >= items_per_batch || current_tokens + tokens > max_tokens)
        {
            batches.push(Batch {
                index: batches.len(),
                items: std::mem::take(&mut current),
            });
            current_tokens = 0;
        }

        if tokens > max_tokens {
            tracing::warn!(item = %stub.id, tokens, max_tokens, "Item alone exceeds the batch token budget");
        }

        current_tokens += tokens;
        current.push(stub);
    }

    if !current.is_empty() {
        batches.push(Batch {
            index: batches.len(),
            items: current,
        });
    }

    batches
}

/// Rough token estimate: one token per four bytes
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}

fn render_item(stub: &ItemStub) -> String {
    format!(
        "<div class=\"harvest-item\" data-item-id=\"{}\">\n\
         <div class=\"harvest-summary\">{}</div>\n\
         <div class=\"harvest-detail\">{}</div>\n\
         </div>\n",
        escape_attr(&stub.id),
        stub.summary_html,
        stub.detail_html.as_deref().unwrap_or_default(),
    )
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
