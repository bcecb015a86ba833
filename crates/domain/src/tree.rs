use crate::{Comment, CommentId, CommentNode};
use std::collections::HashMap;

/// 把按创建时间升序排好的平铺评论行重建为嵌套回复树。
///
/// 两遍扫描：先按 id 建索引，再按输入顺序挂边。父节点悬空
/// (例如级联删除竞态留下的孤儿) 时把该节点提升为根，绝不丢评论。
pub fn build_comment_tree(rows: Vec<Comment>) -> Vec<CommentNode> {
    let mut index: HashMap<CommentId, usize> = HashMap::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        index.insert(row.id.clone(), i);
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); rows.len()];
    let mut roots: Vec<usize> = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        match row.parent_id.as_ref().and_then(|p| index.get(p)).copied() {
            // 自引用视同悬空
            Some(p) if p != i => children[p].push(i),
            _ => roots.push(i),
        }
    }

    let mut slots: Vec<Option<CommentNode>> = rows
        .into_iter()
        .map(|c| Some(CommentNode::new(c)))
        .collect();

    roots
        .iter()
        .filter_map(|&r| assemble(r, &children, &mut slots))
        .collect()
}

// 显式栈做后序组装，线程再深也不会压爆调用栈
fn assemble(
    root: usize,
    children: &[Vec<usize>],
    slots: &mut [Option<CommentNode>],
) -> Option<CommentNode> {
    let mut stack: Vec<(usize, usize)> = vec![(root, 0)];

    while let Some(&(i, cursor)) = stack.last() {
        if let Some(&child) = children[i].get(cursor) {
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }
            stack.push((child, 0));
        } else {
            stack.pop();
            let node = slots[i].take()?;
            match stack.last() {
                Some(&(parent, _)) => {
                    if let Some(p) = slots[parent].as_mut() {
                        p.replies.push(node);
                    }
                }
                None => return Some(node),
            }
        }
    }

    None
}
