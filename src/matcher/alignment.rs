//! Filtering of stray single-stroke matches.
//!
//! A lone hyphen-shaped stroke at the start of a line is usually a drawing
//! artifact; the same stroke extending a word of recognized characters is a
//! real hyphen or underscore. Matches are linked into series using spacing
//! windows derived from the font metrics, and a single-stroke match survives
//! only when its series carries a trustworthy anchor and some multi-stroke
//! character precedes it on the line. This is also what disambiguates
//! hyphens from underscores: only one of the two sits at the right height to
//! continue the word.

use std::collections::HashMap;

use crate::{geometry::Point, sigil::SigilDict, spatial::BoxLookup};

use super::Match;

/// Character gap as a fraction of the width of `V`, the widest character
const GAP_RATIO: f32 = 1.0 / 2.58;

/// A space is two character gaps wide
const SPACE_TO_GAP: f32 = 2.0;

/// Matches on the same line of text have origins within this distance on the
/// cross axis
const MAX_LINE_SEPARATION: f32 = 0.7;

/// Minimum forward separation between consecutive characters
const EPSILON: f32 = 0.001;

/// Neighboring characters must have scale factors within this ratio band
const SCALE_RATIO_BAND: (f32, f32) = (0.9, 1.1);

/// Letters whose upper and lower case shapes differ only by scale. A series
/// anchored solely on one of these gives false confidence.
const CASE_AMBIGUOUS: [char; 8] = ['v', 'V', 'w', 'W', 'x', 'X', 'z', 'Z'];

/// Character spacing heuristics estimated from the widest glyph
struct FontMetrics {
    gap_width: f32,
    space_width: f32,
}

impl FontMetrics {
    fn from_dict(dict: &SigilDict) -> Option<Self> {
        let v_width = dict.get('V')?.first()?.width;
        let gap_width = v_width * GAP_RATIO;

        Some(Self {
            gap_width,
            space_width: gap_width * SPACE_TO_GAP,
        })
    }
}

/// Drop single-stroke matches that do not extend a recognized word.
///
/// Multi-stroke matches always survive. If the dictionary has no `V` to
/// estimate font metrics from, the filter is skipped entirely.
pub(crate) fn check_alignment<'a>(dict: &SigilDict, matches: Vec<Match<'a>>) -> Vec<Match<'a>> {
    let Some(metrics) = FontMetrics::from_dict(dict) else {
        log::warn!("no 'V' sigil to estimate font metrics from; alignment filter skipped");
        return matches;
    };

    let lookup = BoxLookup::new(matches.iter().map(|m| m.origin).collect());

    // directed adjacency between matches: next[i] holds every match placed
    // where the character after matches[i] could start
    let mut next: Vec<Vec<usize>> = vec![Vec::new(); matches.len()];
    let mut indegree = vec![0usize; matches.len()];

    for (i, m) in matches.iter().enumerate() {
        let (min, max) = next_character_window(m, &metrics);

        for j in lookup.search(min, max) {
            let other = &matches[j];

            if other.sig.angle != m.sig.angle {
                continue;
            }

            let ratio = other.sf / m.sf;
            if ratio < SCALE_RATIO_BAND.0 || ratio > SCALE_RATIO_BAND.1 {
                continue;
            }

            next[i].push(j);
            indegree[j] += 1;
        }
    }

    // walk each series from its head, always taking the nearest next
    // character. the graph is acyclic: every edge advances strictly forward
    // along the text direction.
    let mut accepted = vec![false; matches.len()];

    for head in 0..matches.len() {
        if indegree[head] > 0 {
            continue;
        }

        let mut series = vec![head];
        let mut current = head;

        while let Some(&nearest) = next[current].iter().min_by(|&&a, &&b| {
            advance_coordinate(&matches[a]).total_cmp(&advance_coordinate(&matches[b]))
        }) {
            series.push(nearest);
            current = nearest;
        }

        let valid = series.iter().any(|&i| {
            matches[i].sig.ops.len() > 2 && !CASE_AMBIGUOUS.contains(&matches[i].sig.char)
        });

        if !valid {
            continue;
        }

        // single-stroke members count only once a real character has
        // appeared earlier on the line
        let mut seen_multi_stroke = false;
        for &i in &series {
            if matches[i].sig.ops.len() > 1 {
                seen_multi_stroke = true;
                accepted[i] = true;
            } else if seen_multi_stroke {
                accepted[i] = true;
            }
        }
    }

    let mut kept = Vec::with_capacity(matches.len());
    let mut dropped: HashMap<char, usize> = HashMap::new();

    for (i, m) in matches.into_iter().enumerate() {
        if m.sig.ops.len() > 1 || accepted[i] {
            kept.push(m);
        } else {
            *dropped.entry(m.sig.char).or_default() += 1;
        }
    }

    if !dropped.is_empty() {
        log::debug!("alignment filter dropped: {:?}", dropped);
    }

    kept
}

/// Where the next character after `m` may start: just past this glyph's far
/// edge, reaching at most three gaps plus a space further on, and within the
/// same-line tolerance on the cross axis
fn next_character_window(m: &Match, metrics: &FontMetrics) -> (Point, Point) {
    let reach = m.sig.width + 3.0 * metrics.gap_width + metrics.space_width;

    if m.sig.angle == 0.0 {
        (
            Point::new(
                m.origin.x + m.sf * m.sig.width + EPSILON,
                m.origin.y - MAX_LINE_SEPARATION,
            ),
            Point::new(m.origin.x + m.sf * reach, m.origin.y + MAX_LINE_SEPARATION),
        )
    } else {
        // vertically set text advances along y
        (
            Point::new(
                m.origin.x - MAX_LINE_SEPARATION,
                m.origin.y + m.sf * m.sig.width + EPSILON,
            ),
            Point::new(m.origin.x + MAX_LINE_SEPARATION, m.origin.y + m.sf * reach),
        )
    }
}

fn advance_coordinate(m: &Match) -> f32 {
    if m.sig.angle == 0.0 {
        m.origin.x
    } else {
        m.origin.y
    }
}
