// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page list arguments. Users type 1-based numbers; the engine takes 0-based
// indices. Bounds against the document are checked by the engine.

/// Parse a list such as `1,3-5,9` into 0-based indices, in the order given.
pub fn parse_page_list(input: &str) -> Result<Vec<u32>, String> {
    let mut pages = Vec::new();
    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.split_once('-') {
            Some(_) => {
                let (start, end) = parse_page_span(part)?;
                pages.extend(start..=end);
            }
            None => pages.push(page_number(part)? - 1),
        }
    }
    if pages.is_empty() {
        return Err(format!("no pages in '{input}'"));
    }
    Ok(pages)
}

/// Parse an inclusive span such as `2-7` into 0-based `(start, end)`.
pub fn parse_page_span(input: &str) -> Result<(u32, u32), String> {
    let (start, end) = input
        .split_once('-')
        .ok_or_else(|| format!("expected a range like '2-7', got '{input}'"))?;
    let (start, end) = (page_number(start)?, page_number(end)?);
    if start > end {
        return Err(format!("range {start}-{end} runs backwards"));
    }
    Ok((start - 1, end - 1))
}

fn page_number(text: &str) -> Result<u32, String> {
    let text = text.trim();
    match text.parse::<u32>() {
        Ok(0) => Err("page 0 is invalid (pages start at 1)".to_string()),
        Ok(page) => Ok(page),
        Err(_) => Err(format!("invalid page number: '{text}'")),
    }
}
