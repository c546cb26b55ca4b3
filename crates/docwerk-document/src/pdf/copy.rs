// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page copying between lopdf documents.

use std::collections::HashMap;

use docwerk_core::error::{DocwerkError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::warn;

/// Page attributes that may be inherited from ancestor `/Pages` nodes and
/// must be materialised on the copy, since the copy gets a new parent.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Maximum `/Parent` chain walked when resolving inherited attributes.
const MAX_TREE_DEPTH: usize = 64;

/// Copies pages (and every object they transitively reference) from one
/// document into another.
///
/// Objects are cloned at most once per copier, so resources shared by
/// several copied pages stay shared in the target and reference cycles
/// (annotations pointing back at their page) terminate.
pub(crate) struct PageCopier<'a> {
    source: &'a Document,
    /// Source object id -> target object id.
    copied: HashMap<ObjectId, ObjectId>,
}

impl<'a> PageCopier<'a> {
    pub(crate) fn new(source: &'a Document) -> Self {
        Self {
            source,
            copied: HashMap::new(),
        }
    }

    /// Clone the page `page_id` into `target`, returning the new page's id.
    ///
    /// The returned page has no `/Parent`; the caller links it into the
    /// target's page tree.
    pub(crate) fn copy_page(&mut self, target: &mut Document, page_id: ObjectId) -> Result<ObjectId> {
        let source = self.source;
        let mut page = source
            .get_dictionary(page_id)
            .map_err(|err| {
                DocwerkError::PdfError(format!("cannot read page object {page_id:?}: {err}"))
            })?
            .clone();

        for key in INHERITABLE_KEYS {
            if !page.has(key)
                && let Some(value) = inherited_attribute(source, page_id, key)
            {
                page.set(key, value.clone());
            }
        }

        let new_id = target.new_object_id();
        self.copied.insert(page_id, new_id);
        let cloned = self.clone_dictionary(target, &page);
        target.objects.insert(new_id, Object::Dictionary(cloned));
        Ok(new_id)
    }

    fn clone_object(&mut self, target: &mut Document, object: &Object) -> Object {
        match object {
            Object::Dictionary(dict) => Object::Dictionary(self.clone_dictionary(target, dict)),
            Object::Array(items) => Object::Array(
                items
                    .iter()
                    .map(|item| self.clone_object(target, item))
                    .collect(),
            ),
            Object::Stream(stream) => {
                let mut cloned = stream.clone();
                cloned.dict = self.clone_dictionary(target, &stream.dict);
                Object::Stream(cloned)
            }
            Object::Reference(ref_id) => self.clone_reference(target, *ref_id),
            other => other.clone(),
        }
    }

    fn clone_reference(&mut self, target: &mut Document, ref_id: ObjectId) -> Object {
        if let Some(existing) = self.copied.get(&ref_id) {
            return Object::Reference(*existing);
        }

        let source = self.source;
        match source.get_object(ref_id) {
            Ok(referenced) => {
                // Reserve the id before recursing so cycles resolve to it.
                let new_id = target.new_object_id();
                self.copied.insert(ref_id, new_id);
                let cloned = self.clone_object(target, referenced);
                target.objects.insert(new_id, cloned);
                Object::Reference(new_id)
            }
            Err(err) => {
                warn!(?ref_id, %err, "Cannot resolve reference, using Null");
                Object::Null
            }
        }
    }

    /// Clone a dictionary, dropping `/Parent` (page tree links are rebuilt
    /// by the caller).
    fn clone_dictionary(&mut self, target: &mut Document, dict: &Dictionary) -> Dictionary {
        let mut cloned = Dictionary::new();
        for (key, value) in dict.iter() {
            if key == b"Parent" {
                continue;
            }
            let value = self.clone_object(target, value);
            cloned.set(key.clone(), value);
        }
        cloned
    }
}

/// Look up `key` on the page or its ancestors in the page tree.
pub(crate) fn inherited_attribute<'d>(
    doc: &'d Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'d Object> {
    let mut current = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(current).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        current = match node.get(b"Parent") {
            Ok(Object::Reference(parent)) => *parent,
            _ => return None,
        };
    }
    None
}
