use std::ops::Range;

/// What pagination needs to know about a block; nothing about its content.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockFlow {
    pub height: f32,
    /// Gap above the block, dropped when the block opens a page.
    pub space_before: f32,
    pub starts_page: bool,
    /// Never leave this block as the last one on a page (headings).
    pub keep_with_next: bool,
}

impl BlockFlow {
    pub fn new(height: f32) -> Self {
        BlockFlow {
            height,
            space_before: 0.0,
            starts_page: false,
            keep_with_next: false,
        }
    }
}

/// Split blocks into pages of at most `usable_height`.
///
/// Returns one index range per page, in order, covering every block exactly once.
/// A block taller than `usable_height` is given a page of its own.
pub fn paginate(blocks: &[BlockFlow], usable_height: f32) -> Vec<Range<usize>> {
    let mut pages: Vec<Range<usize>> = Vec::new();
    let mut page_start = 0usize;
    let mut used = 0.0f32;

    for (i, block) in blocks.iter().enumerate() {
        let page_empty = i == page_start;

        if block.starts_page && !page_empty {
            pages.push(page_start..i);
            page_start = i;
            used = 0.0;
        }

        let page_empty = i == page_start;
        let mut needed = if page_empty {
            block.height
        } else {
            block.space_before + block.height
        };

        let overflows = !page_empty && used + needed > usable_height;
        let strands_heading = !page_empty && !overflows && block.keep_with_next && {
            match blocks.get(i + 1) {
                Some(next) if !next.starts_page => {
                    let chain = needed + next.space_before + next.height;
                    // Only worth moving if the pair fits on a fresh page.
                    used + chain > usable_height
                        && block.height + next.space_before + next.height <= usable_height
                }
                _ => false,
            }
        };

        if overflows || strands_heading {
            pages.push(page_start..i);
            page_start = i;
            needed = block.height;
            used = 0.0;
        }

        used += needed;
    }

    if page_start < blocks.len() {
        pages.push(page_start..blocks.len());
    }
    pages
}
