//! Removes wrapper forms from a parsed EDIF tree.
//!
//! | form                  | becomes    |
//! |-----------------------|------------|
//! | `(String X)`          | `X`        |
//! | `(InstanceRef X)`     | `X`        |
//! | `(rename X Y)`        | `Y`        |
//! | `(Joined X ...)`      | `(X ...)`  |
//! | `(PortRef X ...)`     | `(X ...)`  |
//!
//! Every other list is kept with its elements reduced.

use edif_sexpr::Sexpr;

/// The known heads of EDIF forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    String,
    InstanceRef,
    Rename,
    Joined,
    PortRef,
    Instance,
    Property,
    Net,
    Other,
}

impl Tag {
    /// Classifies a list by its first element.
    pub fn of(list: &[Sexpr]) -> Self {
        let Some(Sexpr::Token(head) | Sexpr::String(head)) = list.first() else {
            return Self::Other;
        };

        match head.as_str() {
            "String" => Self::String,
            "InstanceRef" => Self::InstanceRef,
            "rename" => Self::Rename,
            "Joined" => Self::Joined,
            "PortRef" => Self::PortRef,
            "Instance" => Self::Instance,
            "Property" => Self::Property,
            "Net" => Self::Net,
            _ => Self::Other,
        }
    }
}

enum Work {
    /// Reduce this value and push the result.
    Reduce(Sexpr),
    /// Pop this many reduced values and push them as one list.
    Collect(usize),
}

/// Recursively removes the wrapper forms listed in the module documentation.
pub fn strip_cruft(root: Sexpr) -> Sexpr {
    let mut work = vec![Work::Reduce(root)];
    let mut done: Vec<Sexpr> = Vec::new();

    while let Some(item) = work.pop() {
        match item {
            Work::Reduce(Sexpr::List(list)) => schedule(list, &mut work),
            Work::Reduce(atom) => done.push(atom),
            Work::Collect(len) => {
                let list = done.split_off(done.len() - len);
                done.push(Sexpr::List(list));
            }
        }
    }

    debug_assert_eq!(done.len(), 1);
    done.pop().unwrap_or(Sexpr::List(Vec::new()))
}

/// Queues the reduction of one list according to its head.
fn schedule(list: Vec<Sexpr>, work: &mut Vec<Work>) {
    let tag = Tag::of(&list);

    let keep = match tag {
        Tag::String | Tag::InstanceRef if list.len() >= 2 => Some(1),
        Tag::Rename if list.len() >= 3 => Some(2),
        Tag::String | Tag::InstanceRef | Tag::Rename => {
            log::warn!("Keeping malformed {tag:?} form with {} elements", list.len());
            None
        }
        _ => None,
    };

    if let Some(index) = keep {
        if let Some(value) = list.into_iter().nth(index) {
            work.push(Work::Reduce(value));
        }
        return;
    }

    let skip = match tag {
        Tag::Joined | Tag::PortRef => 1,
        _ => 0,
    };

    work.push(Work::Collect(list.len() - skip));
    work.extend(list.into_iter().skip(skip).rev().map(Work::Reduce));
}

#[cfg(test)]
mod tests {
    use edif_sexpr::from_str;

    use super::*;

    fn reduced(input: &str) -> Sexpr {
        strip_cruft(from_str(input).unwrap())
    }

    fn contains_wrapper(sexpr: &Sexpr) -> bool {
        let Sexpr::List(list) = sexpr else {
            return false;
        };

        matches!(
            Tag::of(list),
            Tag::String | Tag::InstanceRef | Tag::Rename | Tag::Joined | Tag::PortRef
        ) || list.iter().any(contains_wrapper)
    }

    #[test]
    fn test_tag_of() {
        let list = |input| from_str(input).unwrap().take_list().unwrap();

        assert_eq!(Tag::of(&list("(Net a)")), Tag::Net);
        assert_eq!(Tag::of(&list(r#"("Instance" a)"#)), Tag::Instance);
        assert_eq!(Tag::of(&list("(net a)")), Tag::Other);
        assert_eq!(Tag::of(&list("((Net) a)")), Tag::Other);
        assert_eq!(Tag::of(&list("()")), Tag::Other);
    }

    #[test]
    fn test_unwrap_forms() {
        assert_eq!(reduced(r#"(String "abc")"#), Sexpr::string("abc"));
        assert_eq!(reduced("(InstanceRef U1)"), Sexpr::token("U1"));
        assert_eq!(reduced(r#"(rename foo "Bar")"#), Sexpr::string("Bar"));
        assert_eq!(reduced(r#"(String (rename foo "Bar"))"#), Sexpr::string("Bar"));
    }

    #[test]
    fn test_drop_tag_forms() {
        assert_eq!(
            reduced("(Joined (PortRef &1 (InstanceRef U1)) (PortRef &2 (InstanceRef U2)))"),
            from_str("((&1 U1) (&2 U2))").unwrap()
        );
        assert_eq!(reduced("(PortRef)"), Sexpr::List(vec![]));
    }

    #[test]
    fn test_other_lists_are_kept() {
        assert_eq!(
            reduced(r#"(a 1 (b (String "x")) () c)"#),
            from_str(r#"(a 1 (b "x") () c)"#).unwrap()
        );
        assert_eq!(reduced("atom"), Sexpr::token("atom"));
    }

    #[test]
    fn test_malformed_wrappers_are_kept() {
        assert_eq!(
            reduced("(x (String) (rename a))"),
            from_str("(x (String) (rename a))").unwrap()
        );
    }

    #[test]
    fn test_second_pass_is_a_no_op() {
        let input = r#"
            (Design (rename d "Design 1")
              (Instance (rename R1 "R1") (Property (rename v "Value") (String "1k")))
              (Net (rename n1 "VIN")
                (Joined (PortRef &1 (InstanceRef R1)) (PortRef &2 (InstanceRef C1)))))
        "#;
        let once = reduced(input);

        assert!(!contains_wrapper(&once));
        assert_eq!(strip_cruft(once.clone()), once);
    }

    #[test]
    fn test_deep_nesting() {
        let depth = 10_000;
        let mut sexpr = Sexpr::token("leaf");
        for _ in 0..depth {
            sexpr = Sexpr::List(vec![Sexpr::token("String"), sexpr]);
        }

        assert_eq!(strip_cruft(sexpr), Sexpr::token("leaf"));
    }
}
