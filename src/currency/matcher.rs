use tracing::debug;

use super::noise::NoiseSource;
use super::templates::TemplateTable;
use super::types::{CurrencyTemplate, DominantColor, ShapeClass};
use crate::config::MatcherConfig;

/// Frame signals the matcher scores against
#[derive(Debug, Clone, Copy)]
pub struct MatchInput<'a> {
    pub colors: &'a [DominantColor],
    pub shape: ShapeClass,
    pub average_brightness: f32,
    pub high_contrast: bool,
}

/// Winning template and its confidence
#[derive(Debug, Clone, PartialEq)]
pub struct DenominationMatch<'a> {
    pub template: &'a CurrencyTemplate,
    /// Adjusted score before jitter and capping
    pub score: f64,
    pub confidence: u8,
}

/// Where a template sits among its shape class by face value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Lower,
    Middle,
    Upper,
}

/// Scores templates of one shape class against sampled colors
pub struct DenominationMatcher<'a> {
    config: &'a MatcherConfig,
    table: &'a TemplateTable,
}

impl<'a> DenominationMatcher<'a> {
    pub fn new(config: &'a MatcherConfig, table: &'a TemplateTable) -> Self {
        Self { config, table }
    }

    /// Pick the best template for the input, or none when nothing clears the floor
    pub fn best_match(
        &self,
        input: &MatchInput<'_>,
        noise: &mut dyn NoiseSource,
    ) -> Option<DenominationMatch<'a>> {
        let templates = self.table.templates(input.shape);
        let floor = self.config.confidence_floor(input.shape);

        let mut best: Option<(&'a CurrencyTemplate, f64)> = None;
        for template in templates {
            let Some(similarity) = self.best_similarity(template, input) else {
                continue;
            };

            let score = similarity + self.adjustment(template, templates, input);
            debug!(
                "{} {}: similarity {:.1}, adjusted {:.1}",
                input.shape, template.denomination, similarity, score
            );

            if score <= floor {
                continue;
            }
            // Strictly greater, so the first declared template wins ties
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((template, score));
            }
        }

        let (template, score) = best?;
        let confidence = self.confidence(input.shape, score + noise.jitter());
        Some(DenominationMatch {
            template,
            score,
            confidence,
        })
    }

    /// Highest `100 - distance` over all color pairs inside the distance threshold
    fn best_similarity(&self, template: &CurrencyTemplate, input: &MatchInput<'_>) -> Option<f64> {
        let threshold = self.config.distance_threshold(input.shape);

        template
            .colors()
            .flat_map(|reference| {
                input
                    .colors
                    .iter()
                    .map(move |sampled| reference.distance(&sampled.color))
            })
            .filter(|distance| *distance < threshold)
            .map(|distance| 100.0 - distance)
            .fold(None, |best: Option<f64>, similarity| {
                Some(best.map_or(similarity, |b| b.max(similarity)))
            })
    }

    fn adjustment(
        &self,
        template: &CurrencyTemplate,
        class: &[CurrencyTemplate],
        input: &MatchInput<'_>,
    ) -> f64 {
        let mut bonus = 0.0;

        // Notes only
        if input.high_contrast && input.shape == ShapeClass::Note {
            bonus += self.config.high_contrast_bonus;
        }

        let tier = tier_of(template, class);
        if input.average_brightness < self.config.dark_brightness && tier == Tier::Upper {
            bonus += self.config.brightness_bonus;
        }
        if input.average_brightness > self.config.bright_brightness && tier == Tier::Lower {
            bonus += self.config.brightness_bonus;
        }

        bonus
    }

    fn confidence(&self, shape: ShapeClass, raw: f64) -> u8 {
        let cap = self.config.confidence_cap(shape).min(100) as f64;
        if raw.is_nan() {
            return 0;
        }
        raw.floor().clamp(0.0, cap) as u8
    }
}

/// Lower half or upper half of the class by face value; odd classes leave a middle.
///
/// Rank counts strictly cheaper templates, so equal face values share the
/// lowest rank among them. A class where every value is equal is all lower tier.
fn tier_of(template: &CurrencyTemplate, class: &[CurrencyTemplate]) -> Tier {
    let rank = class.iter().filter(|t| t.value < template.value).count();
    let half = class.len() / 2;

    if rank < half {
        Tier::Lower
    } else if rank >= class.len() - half {
        Tier::Upper
    } else {
        Tier::Middle
    }
}
