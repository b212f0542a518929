//! Unified line diff for grading mismatches.
//!
//! LCS backtrack grouped into hunks with three lines of context, rendered
//! with `---`/`+++` file headers and `@@` range markers.

const CONTEXT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tag {
    Equal,
    Delete,
    Insert,
}

/// A run of identically-tagged lines: `a1..a2` in expected, `b1..b2` in actual.
#[derive(Debug, Clone, Copy)]
struct Opcode {
    tag: Tag,
    a1: usize,
    a2: usize,
    b1: usize,
    b2: usize,
}

/// Render a unified diff of `expected` vs `actual`. Returns an empty string
/// when the sequences are identical.
pub fn unified_diff(expected: &[String], actual: &[String], from: &str, to: &str) -> String {
    let groups = grouped_opcodes(&opcodes(expected, actual));
    if groups.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    out.push_str(&format!("--- {from}\n"));
    out.push_str(&format!("+++ {to}\n"));

    for group in &groups {
        let first = group[0];
        let last = group[group.len() - 1];
        out.push_str(&format!(
            "@@ -{} +{} @@\n",
            format_range(first.a1, last.a2),
            format_range(first.b1, last.b2),
        ));
        for op in group {
            match op.tag {
                Tag::Equal => {
                    for line in &expected[op.a1..op.a2] {
                        out.push_str(&format!(" {line}\n"));
                    }
                }
                Tag::Delete => {
                    for line in &expected[op.a1..op.a2] {
                        out.push_str(&format!("-{line}\n"));
                    }
                }
                Tag::Insert => {
                    for line in &actual[op.b1..op.b2] {
                        out.push_str(&format!("+{line}\n"));
                    }
                }
            }
        }
    }
    out
}

/// `start..stop` rendered in unified-diff header form (1-based, length
/// elided when 1).
fn format_range(start: usize, stop: usize) -> String {
    let length = stop - start;
    if length == 1 {
        return format!("{}", start + 1);
    }
    let beginning = if length == 0 { start } else { start + 1 };
    format!("{beginning},{length}")
}

/// Tagged runs from an LCS edit script over the two line sequences.
fn opcodes(a: &[String], b: &[String]) -> Vec<Opcode> {
    let n = a.len();
    let m = b.len();

    // lcs[i][j] = LCS length of a[i..] and b[j..]
    let mut lcs = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if a[i] == b[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut ops: Vec<Opcode> = Vec::new();
    let mut push = |tag: Tag, a1: usize, a2: usize, b1: usize, b2: usize| {
        if let Some(last) = ops.last_mut() {
            if last.tag == tag {
                last.a2 = a2;
                last.b2 = b2;
                return;
            }
        }
        ops.push(Opcode { tag, a1, a2, b1, b2 });
    };

    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            push(Tag::Equal, i, i + 1, j, j + 1);
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            push(Tag::Delete, i, i + 1, j, j);
            i += 1;
        } else {
            push(Tag::Insert, i, i, j, j + 1);
            j += 1;
        }
    }
    if i < n {
        push(Tag::Delete, i, n, j, j);
    }
    if j < m {
        push(Tag::Insert, i, i, j, m);
    }
    ops
}

/// Split opcodes into hunks, trimming leading/trailing equality to CONTEXT
/// lines and breaking on equal runs longer than twice the context.
fn grouped_opcodes(codes: &[Opcode]) -> Vec<Vec<Opcode>> {
    let mut codes: Vec<Opcode> = codes.to_vec();
    if codes.iter().all(|op| op.tag == Tag::Equal) {
        return Vec::new();
    }

    if let Some(first) = codes.first_mut() {
        if first.tag == Tag::Equal {
            first.a1 = first.a2.saturating_sub(CONTEXT).max(first.a1);
            first.b1 = first.b2.saturating_sub(CONTEXT).max(first.b1);
        }
    }
    if let Some(last) = codes.last_mut() {
        if last.tag == Tag::Equal {
            last.a2 = last.a2.min(last.a1 + CONTEXT);
            last.b2 = last.b2.min(last.b1 + CONTEXT);
        }
    }

    let mut groups: Vec<Vec<Opcode>> = Vec::new();
    let mut group: Vec<Opcode> = Vec::new();
    for op in codes {
        if op.tag == Tag::Equal && op.a2 - op.a1 > CONTEXT * 2 {
            group.push(Opcode {
                tag: Tag::Equal,
                a1: op.a1,
                a2: op.a1 + CONTEXT,
                b1: op.b1,
                b2: op.b1 + CONTEXT,
            });
            groups.push(group);
            group = vec![Opcode {
                tag: Tag::Equal,
                a1: op.a2 - CONTEXT,
                a2: op.a2,
                b1: op.b2 - CONTEXT,
                b2: op.b2,
            }];
            continue;
        }
        group.push(op);
    }
    if !(group.len() == 1 && group[0].tag == Tag::Equal) && !group.is_empty() {
        groups.push(group);
    }
    groups
}
