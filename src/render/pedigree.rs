use crate::models::{present, Pedigree};

use super::escape_html;

pub const PEDIGREE_FIELDS: usize = 14;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AncestorSlot {
    pub label: &'static str,
    pub id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generation {
    pub title: &'static str,
    pub slots: Vec<AncestorSlot>,
}

/// Three generations of normalized ancestor ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PedigreeTree {
    pub horse_id: Option<String>,
    pub generations: [Generation; 3],
}

/// Drops placeholders and links to the site's edit form.
pub fn clean_ancestor(value: &Option<String>) -> Option<String> {
    let v = present(value)?.trim();
    if v.eq_ignore_ascii_case("n/a") || v.contains("horseedit.aspx") {
        return None;
    }
    Some(v.to_string())
}

fn slot(label: &'static str, value: &Option<String>) -> AncestorSlot {
    AncestorSlot {
        label,
        id: clean_ancestor(value),
    }
}

impl PedigreeTree {
    pub fn from_pedigree(p: &Pedigree, horse_id: Option<&str>) -> Self {
        let parents = Generation {
            title: "Parents",
            slots: vec![slot("Sire", &p.sire_id), slot("Dam", &p.dam_id)],
        };
        let grandparents = Generation {
            title: "Grandparents",
            slots: vec![
                slot("Paternal grandsire", &p.paternal_grandsire_id),
                slot("Paternal granddam", &p.paternal_granddam_id),
                slot("Maternal grandsire", &p.maternal_grandsire_id),
                slot("Maternal granddam", &p.maternal_granddam_id),
            ],
        };
        let great_grandparents = Generation {
            title: "Great-grandparents",
            slots: vec![
                slot("Paternal grandsire's sire", &p.paternal_gg_sire_id),
                slot("Paternal grandsire's dam", &p.paternal_gg_dam_id),
                slot("Paternal granddam's sire", &p.paternal_gd_sire_id),
                slot("Paternal granddam's dam", &p.paternal_gd_dam_id),
                slot("Maternal grandsire's sire", &p.maternal_gg_sire_id),
                slot("Maternal grandsire's dam", &p.maternal_gg_dam_id),
                slot("Maternal granddam's sire", &p.maternal_gd_sire_id),
                slot("Maternal granddam's dam", &p.maternal_gd_dam_id),
            ],
        };
        Self {
            horse_id: horse_id.map(str::to_string),
            generations: [parents, grandparents, great_grandparents],
        }
    }

    pub fn filled(&self) -> usize {
        self.generations
            .iter()
            .flat_map(|g| g.slots.iter())
            .filter(|s| s.id.is_some())
            .count()
    }

    /// Percentage of the 14 ancestor fields that hold a usable id.
    pub fn completeness(&self) -> u8 {
        ((self.filled() as f64 / PEDIGREE_FIELDS as f64) * 100.0).round() as u8
    }
}

/// Display form of an ancestor id (`Secretariat_1` -> `Secretariat 1`).
pub fn display_id(id: &str) -> String {
    id.replace('_', " ")
}

/// External renderer for pedigree trees. When none is configured the inline table is used.
pub trait PedigreeViewer: Send + Sync {
    fn render(&self, tree: &PedigreeTree) -> String;
}

/// Renders the tree as a nested sire/dam bracket.
#[derive(Clone, Copy, Debug, Default)]
pub struct BracketViewer;

impl BracketViewer {
    fn node(tree: &PedigreeTree, generation: usize, index: usize) -> String {
        let Some(g) = tree.generations.get(generation) else {
            return String::new();
        };
        let Some(s) = g.slots.get(index) else {
            return String::new();
        };
        let name = s
            .id
            .as_deref()
            .map(|id| escape_html(&display_id(id)))
            .unwrap_or_else(|| "—".to_string());
        let class = if s.id.is_some() { "known" } else { "unknown" };
        let children = format!(
            "{}{}",
            Self::node(tree, generation + 1, index * 2),
            Self::node(tree, generation + 1, index * 2 + 1)
        );
        if children.is_empty() {
            format!(r#"<li class="{class}"><span>{name}</span></li>"#)
        } else {
            format!(r#"<li class="{class}"><span>{name}</span><ul>{children}</ul></li>"#)
        }
    }
}

impl PedigreeViewer for BracketViewer {
    fn render(&self, tree: &PedigreeTree) -> String {
        let root = tree
            .horse_id
            .as_deref()
            .map(|id| escape_html(&display_id(id)))
            .unwrap_or_else(|| "—".to_string());
        format!(
            r#"<div class="pedigree-section pedigree-bracket"><h3>🌳 Pedigree</h3><p class="completeness">Completeness: {}%</p><ul class="bracket"><li class="known"><span>{root}</span><ul>{}{}</ul></li></ul></div>"#,
            tree.completeness(),
            Self::node(tree, 0, 0),
            Self::node(tree, 0, 1)
        )
    }
}

fn render_inline(tree: &PedigreeTree) -> String {
    let mut html = String::new();
    html.push_str(r#"<div class="pedigree-section"><h3>🌳 Pedigree</h3>"#);
    html.push_str(&format!(
        r#"<p class="completeness">Completeness: {}% ({}/{})</p>"#,
        tree.completeness(),
        tree.filled(),
        PEDIGREE_FIELDS
    ));
    html.push_str(r#"<table class="pedigree-table"><tbody>"#);
    for g in tree.generations.iter() {
        html.push_str(&format!(
            r#"<tr class="pedigree-generation"><th colspan="2">{}</th></tr>"#,
            g.title
        ));
        for s in g.slots.iter() {
            let value = s
                .id
                .as_deref()
                .map(|id| escape_html(&display_id(id)))
                .unwrap_or_else(|| "Unknown".to_string());
            html.push_str(&format!("<tr><td>{}</td><td>{}</td></tr>", s.label, value));
        }
    }
    html.push_str("</tbody></table></div>");
    html
}

/// Pedigree block of a horse profile.
pub fn render(
    pedigree: Option<&Pedigree>,
    horse_id: Option<&str>,
    viewer: Option<&dyn PedigreeViewer>,
) -> String {
    let Some(pedigree) = pedigree else {
        return r#"<div class="pedigree-section"><h3>🌳 Pedigree</h3><p class="pedigree-empty">No pedigree data available</p></div>"#.to_string();
    };
    let tree = PedigreeTree::from_pedigree(pedigree, horse_id);
    match viewer {
        Some(v) => v.render(&tree),
        None => render_inline(&tree),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> Pedigree {
        let v = |s: &str| Some(s.to_string());
        Pedigree {
            sire_id: v("Sire_1"),
            dam_id: v("Dam"),
            paternal_grandsire_id: v("a"),
            paternal_granddam_id: v("b"),
            maternal_grandsire_id: v("c"),
            maternal_granddam_id: v("d"),
            paternal_gg_sire_id: v("e"),
            paternal_gg_dam_id: v("f"),
            paternal_gd_sire_id: v("g"),
            paternal_gd_dam_id: v("h"),
            maternal_gg_sire_id: v("i"),
            maternal_gg_dam_id: v("j"),
            maternal_gd_sire_id: v("k"),
            maternal_gd_dam_id: v("l"),
        }
    }

    #[test]
    fn completeness_bounds() {
        assert_eq!(PedigreeTree::from_pedigree(&full(), None).completeness(), 100);
        assert_eq!(
            PedigreeTree::from_pedigree(&Pedigree::default(), None).completeness(),
            0
        );
    }

    #[test]
    fn placeholders_do_not_count() {
        let p = Pedigree {
            sire_id: Some("N/A".to_string()),
            dam_id: Some("https://site/horseedit.aspx?id=1".to_string()),
            paternal_grandsire_id: Some("Real_Horse".to_string()),
            ..Default::default()
        };
        let tree = PedigreeTree::from_pedigree(&p, None);
        assert_eq!(tree.filled(), 1);
        assert_eq!(tree.completeness(), 7);
    }

    #[test]
    fn missing_pedigree_has_placeholder() {
        assert!(render(None, None, None).contains("No pedigree data available"));
    }

    #[test]
    fn inline_table_lists_all_tiers() {
        let html = render(Some(&full()), Some("Colt"), None);
        assert!(html.contains("Great-grandparents"));
        assert!(html.contains("Sire 1"));
        assert!(html.contains("100%"));
    }

    #[test]
    fn viewer_takes_over_when_present() {
        let html = render(Some(&full()), Some("Colt_2"), Some(&BracketViewer));
        assert!(html.contains("pedigree-bracket"));
        assert!(html.contains("Colt 2"));
        assert!(!html.contains("Maternal"));
    }
}
