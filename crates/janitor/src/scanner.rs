//! Recursive folder scanning with video annotation.
//!
//! Walks a remote folder tree depth-first using an explicit frame stack
//! (remote trees of hostile depth must not exhaust the call stack) and
//! produces the flattened descendant set. Each folder entry is appended
//! after its own subtree and carries `folder_has_video`: the OR over its
//! direct children's video flags, which makes the property transitive.
//! A subtree that fails to list, or that sits deeper than
//! [`MAX_SCAN_DEPTH`], yields nothing; sibling scanning continues.

use std::collections::VecDeque;

use putsweep_client::store::RemoteStore;
use putsweep_core::types::{FileId, RemoteEntry};

/// Upper bound on folder nesting. Deeper subtrees are treated as empty.
pub const MAX_SCAN_DEPTH: usize = 64;

struct Frame {
    /// The folder entry being scanned; `None` for the scan root.
    entry: Option<RemoteEntry>,
    pending: VecDeque<RemoteEntry>,
    out: Vec<RemoteEntry>,
    has_video: bool,
}

impl Frame {
    fn new(entry: Option<RemoteEntry>, children: Vec<RemoteEntry>) -> Self {
        Self {
            entry,
            pending: children.into(),
            out: Vec::new(),
            has_video: false,
        }
    }

    /// Append a finished direct child, folding its video flags into this
    /// folder's. Grandchildren go through [`Frame::absorb`] instead so the
    /// fold stays one level deep.
    fn push(&mut self, entry: RemoteEntry) {
        self.has_video |= entry.is_video || (entry.is_folder && entry.folder_has_video);
        self.out.push(entry);
    }

    /// Splice a finished subtree's flattened entries in, without folding.
    fn absorb(&mut self, subtree: Vec<RemoteEntry>) {
        self.out.extend(subtree);
    }
}

/// Scan the folder `root_id` and return its flattened descendant set.
/// The root folder itself is not part of the result.
pub async fn scan_folder<S: RemoteStore>(store: &S, root_id: FileId) -> Vec<RemoteEntry> {
    let mut stack = vec![Frame::new(None, list_or_empty(store, root_id).await)];

    loop {
        let next = stack
            .last_mut()
            .expect("stack holds the root frame until the scan returns")
            .pending
            .pop_front();

        match next {
            Some(child) if child.is_folder && stack.len() <= MAX_SCAN_DEPTH => {
                let children = list_or_empty(store, child.id).await;
                stack.push(Frame::new(Some(child), children));
            }
            Some(child) => {
                if child.is_folder {
                    tracing::warn!(
                        folder_id = child.id,
                        name = %child.name,
                        max_depth = MAX_SCAN_DEPTH,
                        "Folder exceeds the scan depth limit, treating subtree as empty",
                    );
                }
                stack
                    .last_mut()
                    .expect("stack holds the root frame until the scan returns")
                    .push(child);
            }
            None => {
                let done = stack.pop().expect("pop follows a successful last_mut");
                match stack.last_mut() {
                    Some(parent) => {
                        let mut folder = done
                            .entry
                            .expect("non-root frames always wrap a folder entry");
                        folder.folder_has_video = done.has_video;
                        parent.absorb(done.out);
                        parent.push(folder);
                    }
                    None => return done.out,
                }
            }
        }
    }
}

async fn list_or_empty<S: RemoteStore>(store: &S, folder_id: FileId) -> Vec<RemoteEntry> {
    match store.list_children(folder_id).await {
        Ok(children) => children,
        Err(e) => {
            tracing::warn!(
                folder_id,
                error = %e,
                "Failed to list folder, treating subtree as empty",
            );
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
