//! Selector compilation and matching.
//!
//! Grammar: comma-separated alternatives, each a whitespace-separated
//! sequence of tag names with optional `>` tokens between them. `A > B`
//! requires B to be an immediate child of A; `A B` allows any depth in
//! between. Names compare byte for byte, case sensitive.

const DIRECT_CHILD: &str = ">";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: Vec<u8>,
    /// True when the next rule in the chain must be an immediate child.
    pub direct_child: bool,
}

/// A compiled selector: one rule chain per alternative, each read
/// root-to-leaf. Matching walks leaf-to-root against the open-tag stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled {
    chains: Vec<Vec<Rule>>,
}

impl Compiled {
    pub fn new(pattern: &str) -> Self {
        let chains = pattern
            .split(',')
            .filter_map(|part| {
                let chain = compile_chain(part);
                // an alternative with no names can never match
                (!chain.is_empty()).then_some(chain)
            })
            .collect();
        Compiled { chains }
    }

    /// Test against the open-tag stack, root first. The innermost stack
    /// entry (the tag being entered or exited) must match the last rule of
    /// a chain; outer rules are matched walking down the stack, skipping
    /// ancestors unless the rule demands a direct child.
    pub fn matches(&self, stack: &[Vec<u8>]) -> bool {
        self.chains.iter().any(|chain| match_chain(chain, stack))
    }
}

fn compile_chain(source: &str) -> Vec<Rule> {
    let tokens: Vec<&str> = source.split_whitespace().collect();
    let mut rules = Vec::new();

    for (idx, token) in tokens.iter().enumerate() {
        if *token == DIRECT_CHILD {
            continue;
        }
        rules.push(Rule {
            name: token.as_bytes().to_vec(),
            direct_child: tokens.get(idx + 1) == Some(&DIRECT_CHILD),
        });
    }

    rules
}

fn match_chain(rules: &[Rule], stack: &[Vec<u8>]) -> bool {
    let mut rule_idx = rules.len() - 1;

    for name in stack.iter().rev() {
        let rule = &rules[rule_idx];

        if rule.name == *name {
            if rule_idx == 0 {
                return true;
            }
            rule_idx -= 1;
        } else if rule.direct_child || rule_idx == rules.len() - 1 {
            return false;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(names: &[&str]) -> Vec<Vec<u8>> {
        names.iter().map(|n| n.as_bytes().to_vec()).collect()
    }

    #[test]
    fn test_single_name_matches_top_only() {
        let sel = Compiled::new("Child");
        assert!(sel.matches(&stack(&["Root", "Child"])));
        assert!(sel.matches(&stack(&["Child"])));
        assert!(!sel.matches(&stack(&["Child", "Other"])));
        assert!(!sel.matches(&stack(&[])));
    }

    #[test]
    fn test_descendant() {
        let sel = Compiled::new("Root Bar");
        assert!(sel.matches(&stack(&["Root", "Bar"])));
        assert!(sel.matches(&stack(&["Root", "Mid", "Bar"])));
        assert!(!sel.matches(&stack(&["Other", "Bar"])));
        assert!(!sel.matches(&stack(&["Root", "Bar", "Deep"])));
    }

    #[test]
    fn test_direct_child() {
        let sel = Compiled::new("Root > Child");
        assert!(sel.matches(&stack(&["Root", "Child"])));
        assert!(!sel.matches(&stack(&["Root", "Mid", "Child"])));
        assert!(!sel.matches(&stack(&["Child", "Child"])));
    }

    #[test]
    fn test_mixed_direct_and_descendant() {
        let sel = Compiled::new("A > B C");
        assert!(sel.matches(&stack(&["A", "B", "C"])));
        assert!(sel.matches(&stack(&["A", "B", "X", "C"])));
        assert!(!sel.matches(&stack(&["A", "X", "B", "C"])));
    }

    #[test]
    fn test_alternatives() {
        let sel = Compiled::new("Child, Root Bar");
        assert!(sel.matches(&stack(&["Root", "Child"])));
        assert!(sel.matches(&stack(&["Root", "Deep", "Bar"])));
        assert!(!sel.matches(&stack(&["Root", "Other"])));
    }

    #[test]
    fn test_extra_whitespace_ignored() {
        assert_eq!(
            Compiled::new("Root  >  Child"),
            Compiled::new("Root > Child")
        );
    }

    #[test]
    fn test_empty_alternatives_dropped() {
        let sel = Compiled::new("Child, , ");
        assert!(sel.matches(&stack(&["Child"])));
        assert!(!sel.matches(&stack(&["Other"])));
    }
}
