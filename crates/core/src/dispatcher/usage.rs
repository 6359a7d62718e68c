//! Usage strings for help output.

use super::Dispatcher;
use crate::reader::ARGUMENT_SEPARATOR;
use crate::tree::NodeId;

impl<S> Dispatcher<S> {
    /// Every executable path under `node`, one usage line each.
    ///
    /// With `restricted` set, subtrees `source` cannot use are skipped.
    /// Redirects are shown as `-> target`, or `...` when they point at the root.
    pub fn all_usage(&self, node: NodeId, source: &S, restricted: bool) -> Vec<String> {
        let mut result = Vec::new();
        if self.node(node).is_some() {
            self.collect_usage(node, source, &mut result, String::new(), restricted);
        }
        result
    }

    fn collect_usage(
        &self,
        node: NodeId,
        source: &S,
        result: &mut Vec<String>,
        prefix: String,
        restricted: bool,
    ) {
        let entry = self.get(node);
        if restricted && !entry.can_use(source) {
            return;
        }
        if entry.executor.is_some() {
            result.push(prefix.clone());
        }
        if let Some(target) = entry.redirect {
            let redirect = self.redirect_text(target);
            if prefix.is_empty() {
                result.push(format!("{}{ARGUMENT_SEPARATOR}{redirect}", entry.usage_text()));
            } else {
                result.push(format!("{prefix}{ARGUMENT_SEPARATOR}{redirect}"));
            }
        } else {
            for &child in &entry.children {
                let usage = self.get(child).usage_text();
                let next = if prefix.is_empty() {
                    usage
                } else {
                    format!("{prefix}{ARGUMENT_SEPARATOR}{usage}")
                };
                self.collect_usage(child, source, result, next, restricted);
            }
        }
    }

    /// A compact usage line for each child of `node` that `source` can use,
    /// keyed by child in insertion order.
    ///
    /// Optional tails are bracketed (`[<amount>]`) and alternatives are
    /// grouped (`(day|night)`).
    pub fn smart_usage(&self, node: NodeId, source: &S) -> Vec<(NodeId, String)> {
        let Some(entry) = self.node(node) else {
            return Vec::new();
        };
        let optional = entry.executor.is_some();
        entry
            .children
            .iter()
            .filter_map(|&child| {
                self.smart_usage_of(child, source, optional, false)
                    .map(|usage| (child, usage))
            })
            .collect()
    }

    fn smart_usage_of(&self, node: NodeId, source: &S, optional: bool, deep: bool) -> Option<String> {
        let entry = self.get(node);
        if !entry.can_use(source) {
            return None;
        }
        let this = if optional {
            format!("[{}]", entry.usage_text())
        } else {
            entry.usage_text()
        };
        if deep {
            return Some(this);
        }
        if let Some(target) = entry.redirect {
            return Some(format!("{this}{ARGUMENT_SEPARATOR}{}", self.redirect_text(target)));
        }

        let child_optional = entry.executor.is_some();
        let (open, close) = if child_optional { ("[", "]") } else { ("(", ")") };
        let children: Vec<NodeId> = entry
            .children
            .iter()
            .copied()
            .filter(|&c| self.get(c).can_use(source))
            .collect();
        match children.as_slice() {
            [] => {}
            [only] => {
                if let Some(usage) = self.smart_usage_of(*only, source, child_optional, child_optional) {
                    return Some(format!("{this}{ARGUMENT_SEPARATOR}{usage}"));
                }
            }
            many => {
                let mut child_usage: Vec<String> = Vec::new();
                for &child in many {
                    if let Some(usage) = self.smart_usage_of(child, source, child_optional, true)
                        && !child_usage.contains(&usage)
                    {
                        child_usage.push(usage);
                    }
                }
                if let [usage] = child_usage.as_slice() {
                    let usage = if child_optional {
                        format!("[{usage}]")
                    } else {
                        usage.clone()
                    };
                    return Some(format!("{this}{ARGUMENT_SEPARATOR}{usage}"));
                }
                if child_usage.len() > 1 {
                    let alternatives: Vec<String> =
                        many.iter().map(|&c| self.get(c).usage_text()).collect();
                    return Some(format!(
                        "{this}{ARGUMENT_SEPARATOR}{open}{}{close}",
                        alternatives.join("|")
                    ));
                }
            }
        }
        Some(this)
    }

    fn redirect_text(&self, target: NodeId) -> String {
        if target == NodeId::ROOT {
            "...".to_string()
        } else {
            format!("-> {}", self.get(target).usage_text())
        }
    }
}
