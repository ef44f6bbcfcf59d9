//! The `dot` module contains the conversion from a table set to a graphviz dot format.
//! The functions in this module are used for testing and debugging purposes.

use std::collections::BTreeMap;
use std::io::Write;

use dot_writer::{Attributes, DotWriter, RankDirection};

use crate::{Result, TableSet};

use super::{ClassID, StateID, TableInterpreter};

/// Render the automaton of a table set to a graphviz dot format.
/// Transitions are resolved through the default chains, parallel edges are merged and labeled
/// with their class numbers.
pub(crate) fn table_set_render<W: Write>(
    tables: &TableSet,
    label: &str,
    output: &mut W,
) -> Result<()> {
    let interp = TableInterpreter::new(tables);
    let entry_states: Vec<u32> = std::iter::once(&tables.initial)
        .chain(tables.start_conditions.iter().map(|sc| &sc.condition))
        .flat_map(|sc| [sc.state, sc.bol_state])
        .collect();

    let mut edges: BTreeMap<(usize, usize), Vec<usize>> = BTreeMap::new();
    for state in 0..tables.num_states() {
        for class in 0..tables.num_classes() {
            let target = interp.transition(
                StateID::new(state as u32),
                ClassID::new(class as u32),
            )?;
            if let Some(target) = target {
                edges
                    .entry((state, target.as_usize()))
                    .or_default()
                    .push(class);
            }
        }
    }

    let mut writer = DotWriter::from(output);
    writer.set_pretty_print(true);
    let mut digraph = writer.digraph();
    digraph
        .set_label(label)
        .set_rank_direction(RankDirection::LeftRight);
    for (state, accept) in tables.accept.iter().enumerate() {
        let mut node = digraph.node_auto();
        node.set_label(&state.to_string());
        if entry_states.contains(&(state as u32)) {
            node.set_shape(dot_writer::Shape::Circle)
                .set_color(dot_writer::Color::Blue)
                .set_pen_width(3.0);
        }
        if *accept != 0 {
            node.set_color(dot_writer::Color::Red)
                .set_pen_width(3.0)
                .set_label(&format!("{}\nrule {}", state, accept));
        }
    }
    for ((source, target), classes) in edges {
        let classes: Vec<String> = classes.iter().map(|c| c.to_string()).collect();
        digraph
            .edge(&format!("node_{}", source), &format!("node_{}", target))
            .attributes()
            .set_label(&classes.join(","));
    }
    Ok(())
}
