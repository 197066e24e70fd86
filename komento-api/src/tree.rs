use std::collections::HashMap;

use crate::{Comment, CommentId, CommentNode};

/// Rebuilds the reply forest from a flat comment list.
///
/// Two passes: index every comment by id, then link each one under its
/// parent. Input order is preserved at every level, so whatever sort the
/// store applied decides both root order and sibling order. A comment whose
/// parent id resolves to nothing (or to itself) is promoted to a standalone
/// root instead of being dropped.
pub fn build_tree(comments: Vec<Comment>) -> Vec<CommentNode> {
    let index: HashMap<CommentId, usize> = comments
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id, i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); comments.len()];
    let mut roots: Vec<usize> = Vec::new();
    for (i, c) in comments.iter().enumerate() {
        match c.parent_id.and_then(|p| index.get(&p)).copied() {
            Some(parent) if parent != i => children[parent].push(i),
            _ => roots.push(i),
        }
    }

    let mut slots: Vec<Option<Comment>> = comments.into_iter().map(Some).collect();
    roots
        .into_iter()
        .map(|r| assemble(r, &mut slots, &children))
        .collect()
}

fn assemble(
    idx: usize,
    slots: &mut Vec<Option<Comment>>,
    children: &[Vec<usize>],
) -> CommentNode {
    let kids = children[idx]
        .iter()
        .map(|&k| assemble(k, slots, children))
        .collect();
    CommentNode {
        comment: slots[idx].take().expect("comment linked twice"),
        children: kids,
    }
}

/// One page of root-level threads plus the bookkeeping the frontend renders.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub comments: Vec<CommentNode>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl Page {
    /// Slices the root list. A thread rides along with its root in full, so
    /// replies never count toward the page size, and an out-of-range page
    /// comes back empty rather than failing. Callers guarantee `page` and
    /// `limit` are at least 1.
    pub fn assemble(roots: Vec<CommentNode>, page: usize, limit: usize) -> Page {
        let total_items = roots.len();
        let total_pages = (total_items + limit - 1) / limit;
        let comments = roots
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();
        Page {
            comments,
            current_page: page,
            total_pages,
            total_items,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;

    fn id(n: u128) -> CommentId {
        CommentId(Uuid::from_u128(n))
    }

    fn comment(n: u128, parent: Option<u128>) -> Comment {
        Comment {
            id: id(n),
            parent_id: parent.map(id),
            name: format!("user-{n}"),
            email: format!("user-{n}@example.com"),
            content: format!("comment {n}"),
            created_at: chrono::Utc.timestamp_opt(1_700_000_000 + n as i64, 0).unwrap(),
            ip: None,
        }
    }

    fn count_nodes(nodes: &[CommentNode]) -> usize {
        nodes
            .iter()
            .map(|n| 1 + count_nodes(&n.children))
            .sum()
    }

    #[test]
    fn links_children_under_their_parent() {
        let tree = build_tree(vec![
            comment(1, None),
            comment(2, Some(1)),
            comment(3, Some(1)),
            comment(4, Some(2)),
        ]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].comment.id, id(1));
        assert_eq!(tree[0].children.len(), 2);
        assert_eq!(tree[0].children[0].comment.id, id(2));
        assert_eq!(tree[0].children[1].comment.id, id(3));
        assert_eq!(tree[0].children[0].children[0].comment.id, id(4));
    }

    #[test]
    fn preserves_input_order_at_every_level() {
        // store-ordered newest first
        let tree = build_tree(vec![
            comment(5, None),
            comment(4, Some(1)),
            comment(3, None),
            comment(2, Some(1)),
            comment(1, None),
        ]);
        let roots: Vec<_> = tree.iter().map(|n| n.comment.id).collect();
        assert_eq!(roots, vec![id(5), id(3), id(1)]);
        let siblings: Vec<_> = tree[2].children.iter().map(|n| n.comment.id).collect();
        assert_eq!(siblings, vec![id(4), id(2)]);
    }

    #[test]
    fn promotes_orphans_to_roots() {
        let tree = build_tree(vec![comment(1, None), comment(2, Some(99))]);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[1].comment.id, id(2));
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn never_loses_or_duplicates_a_comment() {
        let input = vec![
            comment(1, None),
            comment(2, Some(1)),
            comment(3, Some(7)), // orphan
            comment(4, Some(2)),
            comment(5, Some(5)), // self-reference
            comment(6, None),
        ];
        let n = input.len();
        let tree = build_tree(input);
        assert_eq!(count_nodes(&tree), n);
    }

    #[test]
    fn empty_input_yields_empty_forest() {
        assert!(build_tree(Vec::new()).is_empty());
    }

    #[test]
    fn paginates_roots_with_threads_attached() {
        // a thread, a bare root and an orphan, in insertion order
        let tree = build_tree(vec![
            comment(1, None),
            comment(2, Some(1)),
            comment(3, None),
            comment(4, Some(99)),
        ]);

        let page1 = Page::assemble(tree.clone(), 1, 1);
        assert_eq!(page1.total_items, 3);
        assert_eq!(page1.total_pages, 3);
        assert_eq!(page1.current_page, 1);
        assert_eq!(page1.comments.len(), 1);
        assert_eq!(page1.comments[0].comment.id, id(1));
        assert_eq!(page1.comments[0].children[0].comment.id, id(2));

        let page2 = Page::assemble(tree.clone(), 2, 1);
        assert_eq!(page2.comments[0].comment.id, id(3));

        let page3 = Page::assemble(tree, 3, 1);
        assert_eq!(page3.comments[0].comment.id, id(4));
        assert!(page3.comments[0].children.is_empty());
    }

    #[test]
    fn page_slices_are_disjoint_and_cover_all_roots() {
        let roots = build_tree((1..=7).map(|n| comment(n, None)).collect());
        let limit = 3;
        let total = Page::assemble(roots.clone(), 1, limit).total_pages;
        assert_eq!(total, 3);

        let mut seen = Vec::new();
        for page in 1..=total {
            let p = Page::assemble(roots.clone(), page, limit);
            seen.extend(p.comments.iter().map(|n| n.comment.id));
        }
        let expected: Vec<_> = roots.iter().map(|n| n.comment.id).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn out_of_range_page_is_empty_not_an_error() {
        let roots = build_tree(vec![comment(1, None)]);
        let p = Page::assemble(roots, 5, 15);
        assert!(p.comments.is_empty());
        assert_eq!(p.current_page, 5);
        assert_eq!(p.total_pages, 1);
        assert_eq!(p.total_items, 1);
    }

    #[test]
    fn empty_board_has_zero_pages() {
        let p = Page::assemble(Vec::new(), 1, 15);
        assert!(p.comments.is_empty());
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.total_items, 0);
    }
}
