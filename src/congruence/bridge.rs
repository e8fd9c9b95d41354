//! Bridges converting a finished engine of one flavour into a starting
//! state of another.
//!
//! - A finite [`FroidurePin`] yields a presentation (its rules over its
//!   generator letters), a seeded [`ToddCoxeter`] (the right Cayley
//!   graph, rooted, becomes the initial word graph), or a
//!   [`KnuthBendix`].
//! - A finished two-sided [`ToddCoxeter`] yields a [`KnuthBendix`] over
//!   the same presentation and pairs, or a [`FroidurePin`] over its
//!   class elements ([`ClassElement`]), whose multiplication follows
//!   normal-form words through the standardised word graph.

use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::CongruenceKind;
use crate::element::Element;
use crate::froidure_pin::{FroidurePin, FroidurePinError};
use crate::knuth_bendix::{KnuthBendix, KnuthBendixError};
use crate::presentation::Presentation;
use crate::todd_coxeter::{ToddCoxeter, ToddCoxeterError};
use crate::word::{Letter, Word};
use crate::word_graph::{Node, WordGraph};

/// The defining presentation of a finite enumeration: one letter per
/// generator, the discovered rules as relations.
pub fn to_presentation<T: Element>(fp: &mut FroidurePin<T>) -> Presentation {
    fp.run();
    let mut p = Presentation::new(fp.number_of_generators());
    for (lhs, rhs) in fp.rules() {
        p.add_rule(lhs, rhs).expect("rules are over the generator letters");
    }
    p
}

/// A Todd–Coxeter engine seeded with the right Cayley graph of a finite
/// enumeration: node 0 is a fresh root, node `i + 1` is element `i`.
pub fn to_todd_coxeter<T: Element>(
    kind: CongruenceKind,
    fp: &mut FroidurePin<T>,
) -> Result<ToddCoxeter, ToddCoxeterError> {
    let p = to_presentation(fp);
    let letters = fp.number_of_generators();
    let size = fp.current_size();
    let mut graph = WordGraph::new(size + 1, letters);
    for a in 0..letters {
        let generator = fp.generator(a as Letter).clone();
        let target = fp
            .current_position(&generator)
            .expect("generators are elements");
        graph.set_target(0, a as Letter, target as Node + 1);
    }
    for i in 0..size {
        for a in 0..letters {
            let target = fp
                .right_target(i, a as Letter)
                .expect("finished enumeration has complete rows");
            graph.set_target(i as Node + 1, a as Letter, target as Node + 1);
        }
    }
    ToddCoxeter::with_word_graph(kind, p, &graph)
}

/// A Knuth–Bendix engine over the defining presentation of a finite
/// enumeration.
pub fn to_knuth_bendix<T: Element>(
    kind: CongruenceKind,
    fp: &mut FroidurePin<T>,
) -> Result<KnuthBendix, KnuthBendixError> {
    KnuthBendix::new(kind, to_presentation(fp))
}

/// A Knuth–Bendix engine over the same presentation and generating pairs
/// as a (two-sided) Todd–Coxeter engine.
pub fn todd_coxeter_to_knuth_bendix(tc: &ToddCoxeter) -> Result<KnuthBendix, KnuthBendixError> {
    let mut kb = KnuthBendix::new(tc.kind(), tc.presentation().clone())?;
    for (u, v) in tc.generating_pairs().to_vec() {
        kb.add_generating_pair(&u, &v)?;
    }
    Ok(kb)
}

// ------------------------------------------------------------------------------------------------
// Todd-Coxeter classes as elements
// ------------------------------------------------------------------------------------------------

struct ClassTable {
    graph: WordGraph,
    /// The normal-form word of every node (node 0 is the empty word).
    words: Vec<Word>,
}

/// A congruence class of a finished two-sided Todd–Coxeter engine,
/// viewed as an element: composition follows the other class's
/// normal-form word through the shared word graph.
#[derive(Clone)]
pub struct ClassElement {
    table: Rc<ClassTable>,
    node: Node,
}

impl ClassElement {
    /// The word-graph node (class) this element denotes.
    pub fn node(&self) -> Node {
        self.node
    }

    /// The normal-form word of this class.
    pub fn word(&self) -> &Word {
        &self.table.words[self.node as usize]
    }
}

impl PartialEq for ClassElement {
    fn eq(&self, other: &Self) -> bool {
        debug_assert!(Rc::ptr_eq(&self.table, &other.table));
        self.node == other.node
    }
}

impl Eq for ClassElement {}

impl Hash for ClassElement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node.hash(state);
    }
}

impl std::fmt::Debug for ClassElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ClassElement({:?})", self.word())
    }
}

impl Element for ClassElement {
    fn compose(&self, other: &Self) -> Self {
        let node = self
            .table
            .graph
            .follow_path(self.node, other.word())
            .expect("finished word graph is complete");
        Self {
            table: Rc::clone(&self.table),
            node,
        }
    }

    fn degree(&self) -> usize {
        0
    }

    fn complexity(&self) -> usize {
        self.word().len().max(1)
    }
}

/// A Froidure–Pin engine over the classes of a finished two-sided
/// Todd–Coxeter engine: one generator per letter, plus the class of the
/// empty word when the presentation contains it.
pub fn to_froidure_pin(
    tc: &mut ToddCoxeter,
) -> Result<FroidurePin<ClassElement>, FroidurePinError> {
    if tc.kind() != CongruenceKind::TwoSided {
        return Err(FroidurePinError::InvalidArgument(
            "only the classes of a two-sided congruence form a semigroup".to_string(),
        ));
    }
    tc.run();
    let forms = tc
        .normal_forms()
        .expect("finished engine enumerates normal forms");
    let offset = usize::from(!tc.presentation().contains_empty_word());
    let mut words = vec![Word::new(); forms.len() + offset];
    for (class, form) in forms.into_iter().enumerate() {
        words[class + offset] = form;
    }
    let table = Rc::new(ClassTable {
        graph: tc.word_graph(),
        words,
    });
    let mut generators = Vec::new();
    if tc.presentation().contains_empty_word() {
        generators.push(ClassElement {
            table: Rc::clone(&table),
            node: 0,
        });
    }
    for a in 0..tc.presentation().alphabet_size() as u8 {
        let node = table
            .graph
            .target(0, a)
            .expect("finished word graph is complete");
        generators.push(ClassElement {
            table: Rc::clone(&table),
            node,
        });
    }
    FroidurePin::new(generators)
}
