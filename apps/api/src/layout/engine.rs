//! Layout Engine: turns a normalized resume plus a template into a `LayoutPlan`.
//!
//! # Pipeline
//! 1. Select content: cap jobs, rank and cap bullets, truncate text (font independent)
//! 2. Pick one document-wide font tier from the selected content volume
//! 3. Measure every block against its column width
//! 4. Stack sections top-down, one cursor per column
//! 5. Analyze page fill; rescale once, then trim coursework, then trailing jobs
//!
//! The engine is synchronous and pure. HTTP callers run it inside
//! `tokio::task::spawn_blocking`.

use tracing::{debug, warn};

use crate::document::models::{Defaults, EduEntry, JobEntry, ResumeDocument};
use crate::layout::font_scale::{FontScaler, FontSizes};
use crate::layout::page_fill::{analyze_page_fill, recommend_fill_action, FillAction, TrimBudget};
use crate::layout::plan::{
    BlockKind, Column, ContainerBox, ContainerKind, LayoutPlan, PositionedBlock, TrimmedContent,
};
use crate::layout::text_fit::{line_box, truncate, TextFitter};
use crate::scoring::ContentScorer;
use crate::templates::{ColumnFrame, Geometry, Limits, Section, TemplateConfig};

/// Left indent of achievement bullets inside a job entry, in points.
const BULLET_INDENT: f32 = 12.0;
const SKILL_SEPARATOR: &str = " · ";

// ────────────────────────────────────────────────────────────────────────────
// Selected content (font independent)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct SelectedJob {
    index: usize,
    title: String,
    company: String,
    header: String,
    bullets: Vec<String>,
    technologies: String,
}

#[derive(Debug, Clone)]
struct SelectedEducation {
    index: usize,
    institution: String,
    entry: String,
    coursework: Option<String>,
}

#[derive(Debug, Clone)]
struct SelectedContent {
    header: String,
    summary: String,
    jobs: Vec<SelectedJob>,
    skills: String,
    education: Vec<SelectedEducation>,
}

impl SelectedContent {
    /// Characters that will end up on the page; drives the font tier.
    fn volume(&self) -> usize {
        let jobs: usize = self
            .jobs
            .iter()
            .map(|job| {
                char_len(&job.header)
                    + char_len(&job.technologies)
                    + job.bullets.iter().map(|b| char_len(b)).sum::<usize>()
            })
            .sum();
        let education: usize = self
            .education
            .iter()
            .map(|edu| char_len(&edu.entry) + edu.coursework.as_deref().map_or(0, char_len))
            .sum();
        char_len(&self.summary) + char_len(&self.skills) + jobs + education
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

// ────────────────────────────────────────────────────────────────────────────
// Measured drafts (positions not yet assigned)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct BlockDraft {
    kind: BlockKind,
    /// Horizontal offset inside the column (or card).
    inset: f32,
    height: f32,
    font_size: f32,
    content: String,
}

#[derive(Debug, Clone)]
struct GroupDraft {
    kind: ContainerKind,
    index: usize,
    blocks: Vec<BlockDraft>,
    /// Recorded in the plan if this group (jobs) or its coursework (education) is trimmed.
    trim_record: TrimmedContent,
}

#[derive(Debug, Clone)]
enum ItemDraft {
    Block(BlockDraft),
    Group(GroupDraft),
}

#[derive(Debug, Clone)]
struct SectionDraft {
    section: Section,
    frame: ColumnFrame,
    title: BlockDraft,
    items: Vec<ItemDraft>,
}

#[derive(Debug, Clone)]
struct Drafts {
    header: BlockDraft,
    sections: Vec<SectionDraft>,
}

impl Drafts {
    fn coursework_count(&self) -> usize {
        self.groups()
            .flat_map(|g| g.blocks.iter())
            .filter(|b| b.kind == BlockKind::Coursework)
            .count()
    }

    fn job_count(&self) -> usize {
        self.groups().filter(|g| g.kind == ContainerKind::Job).count()
    }

    fn experience_column(&self) -> Option<Column> {
        self.sections
            .iter()
            .find(|s| s.section == Section::Experience)
            .map(|s| s.frame.column)
    }

    fn groups(&self) -> impl Iterator<Item = &GroupDraft> + '_ {
        self.sections.iter().flat_map(|s| {
            s.items.iter().filter_map(|item| match item {
                ItemDraft::Group(group) => Some(group),
                ItemDraft::Block(_) => None,
            })
        })
    }

    /// Removes every coursework block. Returns one record per entry that lost one.
    fn drop_coursework(&mut self) -> Vec<TrimmedContent> {
        let mut dropped = Vec::new();
        for section in &mut self.sections {
            for item in &mut section.items {
                if let ItemDraft::Group(group) = item {
                    let before = group.blocks.len();
                    group.blocks.retain(|b| b.kind != BlockKind::Coursework);
                    if group.blocks.len() < before {
                        dropped.push(group.trim_record.clone());
                    }
                }
            }
        }
        dropped
    }

    /// Removes the last job entry, unless it is the only one.
    fn drop_last_job(&mut self) -> Option<TrimmedContent> {
        let section = self
            .sections
            .iter_mut()
            .find(|s| s.section == Section::Experience)?;
        if section.items.len() <= 1 {
            return None;
        }
        match section.items.pop()? {
            ItemDraft::Group(group) => Some(group.trim_record),
            ItemDraft::Block(_) => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stacked result
// ────────────────────────────────────────────────────────────────────────────

struct Stacked {
    blocks: Vec<PositionedBlock>,
    containers: Vec<ContainerBox>,
    main_bottom: f32,
    side_bottom: f32,
    page_height: f32,
}

impl Stacked {
    fn column_bottom(&self, column: Column) -> f32 {
        match column {
            Column::Side => self.side_bottom,
            Column::Main => self.main_bottom,
            Column::Full => self.main_bottom.max(self.side_bottom),
        }
    }
}

/// One vertical cursor per column. Full-width placements never advance them.
struct Cursors {
    main: f32,
    side: f32,
}

impl Cursors {
    fn at(&mut self, column: Column) -> &mut f32 {
        match column {
            Column::Side => &mut self.side,
            Column::Main | Column::Full => &mut self.main,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

pub struct LayoutEngine<'a> {
    scorer: &'a dyn ContentScorer,
    scaler: FontScaler,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(scorer: &'a dyn ContentScorer) -> Self {
        Self {
            scorer,
            scaler: FontScaler::default(),
        }
    }

    /// Computes the plan. Never fails: any normalized document yields a plan,
    /// with `overflow` set if it cannot be made to fit.
    pub fn layout(&self, doc: &ResumeDocument, config: &TemplateConfig) -> LayoutPlan {
        let geometry = &config.geometry;
        let fitter = TextFitter::new(config.font);
        let selected = self.select(doc, &config.limits);
        let volume = selected.volume();

        let mut fonts = self.scaler.scale(volume, geometry.base_font_size);
        let mut drafts = measure(&selected, config, &fitter, &fonts);
        let mut rescaled = false;
        let mut trimmed = Vec::new();

        loop {
            let stacked = stack(&drafts, geometry);
            let analysis = analyze_page_fill(stacked.page_height, geometry.max_height);
            let experience_overflows = drafts.experience_column().is_some_and(|column| {
                stacked.column_bottom(column) + geometry.margin > geometry.max_height
            });
            let budget = TrimBudget {
                can_rescale: !rescaled
                    && self.scaler.tighten(fonts.factor, analysis.fill_ratio).is_some(),
                coursework_blocks: drafts.coursework_count(),
                jobs: drafts.job_count(),
                experience_overflows,
            };

            match recommend_fill_action(&analysis, &budget) {
                FillAction::NoAction => {
                    debug!(
                        template = %config.name,
                        volume,
                        factor = fonts.factor,
                        page_height = stacked.page_height,
                        trimmed = trimmed.len(),
                        "Layout fits"
                    );
                    return finish(config, fonts, stacked, rescaled, trimmed, false);
                }
                FillAction::Rescale { fill_ratio } => {
                    let Some(factor) = self.scaler.tighten(fonts.factor, fill_ratio) else {
                        rescaled = true;
                        continue;
                    };
                    debug!(
                        from = fonts.factor,
                        to = factor,
                        page_height = stacked.page_height,
                        "Layout overflow: rescaling fonts"
                    );
                    fonts = self.scaler.sizes(geometry.base_font_size, factor);
                    drafts = measure(&selected, config, &fitter, &fonts);
                    rescaled = true;
                }
                FillAction::DropCoursework => {
                    let dropped = drafts.drop_coursework();
                    debug!(entries = dropped.len(), "Layout overflow: dropping coursework");
                    trimmed.extend(dropped);
                }
                FillAction::DropLastJob => match drafts.drop_last_job() {
                    Some(record) => {
                        debug!(?record, "Layout overflow: dropping last job");
                        trimmed.push(record);
                    }
                    None => {
                        return finish(config, fonts, stacked, rescaled, trimmed, true);
                    }
                },
                FillAction::AcceptOverflow => {
                    warn!(
                        template = %config.name,
                        page_height = stacked.page_height,
                        max_height = geometry.max_height,
                        "Layout still overflows with nothing left to trim"
                    );
                    return finish(config, fonts, stacked, rescaled, trimmed, true);
                }
            }
        }
    }

    // ── Selection ────────────────────────────────────────────────────────────

    fn select(&self, doc: &ResumeDocument, limits: &Limits) -> SelectedContent {
        let identity = &doc.identity;
        let header = format!("{}\n{}", identity.full_name, identity.contact_line());

        let jobs = doc
            .experience
            .iter()
            .take(limits.max_jobs_shown)
            .enumerate()
            .map(|(index, job)| self.select_job(index, job, limits))
            .collect();

        let skills = doc
            .skills
            .iter()
            .take(limits.max_skills_shown)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(SKILL_SEPARATOR);

        let education = doc
            .education
            .iter()
            .enumerate()
            .map(|(index, edu)| select_education(index, edu))
            .collect();

        SelectedContent {
            header,
            summary: truncate(&doc.summary, limits.summary_chars, true),
            jobs,
            skills,
            education,
        }
    }

    fn select_job(&self, index: usize, job: &JobEntry, limits: &Limits) -> SelectedJob {
        let pool: Vec<String> = job
            .achievements
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect();

        let mut bullets: Vec<String> = if !pool.is_empty() {
            self.scorer
                .select_top(&pool, limits.max_achievements_per_job)
                .iter()
                .map(|b| truncate(b, limits.job_description_chars, true))
                .filter(|b| !b.is_empty())
                .collect()
        } else {
            let description = truncate(&job.description, limits.job_description_chars, true);
            if description.is_empty() {
                Vec::new()
            } else {
                vec![description]
            }
        };
        if bullets.is_empty() {
            bullets.push(Defaults::job_bullet(&job.title, &job.company));
        }

        SelectedJob {
            index,
            title: job.title.clone(),
            company: job.company.clone(),
            header: format!("{}\n{}", job.title, job.meta_line()),
            bullets,
            technologies: job.technologies.join(", "),
        }
    }
}

fn select_education(index: usize, edu: &EduEntry) -> SelectedEducation {
    let coursework = (!edu.coursework.is_empty())
        .then(|| format!("Coursework: {}", edu.coursework.join(", ")));
    SelectedEducation {
        index,
        institution: edu.institution.clone(),
        entry: format!("{}\n{}", edu.headline(), edu.meta_line()),
        coursework,
    }
}

/// Lays out `doc` with the default `ImpactScorer`.
#[cfg(test)]
pub fn layout(doc: &ResumeDocument, config: &TemplateConfig) -> LayoutPlan {
    let scorer = crate::scoring::ImpactScorer::new();
    LayoutEngine::new(&scorer).layout(doc, config)
}

// ────────────────────────────────────────────────────────────────────────────
// Measurement
// ────────────────────────────────────────────────────────────────────────────

fn measure(
    selected: &SelectedContent,
    config: &TemplateConfig,
    fitter: &TextFitter,
    fonts: &FontSizes,
) -> Drafts {
    let geometry = &config.geometry;
    let lh = geometry.line_height;
    let pad = geometry.card_padding;

    let header = BlockDraft {
        kind: BlockKind::Header,
        inset: 0.0,
        height: geometry.header_height,
        font_size: fonts.title,
        content: selected.header.clone(),
    };

    // At least one line, at most what the estimate says.
    let text_height = |text: &str, size: f32, width: f32| {
        fitter
            .estimate_height(text, size, lh, width)
            .max(line_box(size, lh))
    };

    let mut sections = Vec::new();
    for placement in &config.sections {
        let frame = geometry.frame(placement.slot);
        let card_width = (frame.width - 2.0 * pad).max(0.0);

        let items: Vec<ItemDraft> = match placement.section {
            Section::Summary if !selected.summary.is_empty() => vec![ItemDraft::Block(BlockDraft {
                kind: BlockKind::Summary,
                inset: 0.0,
                height: text_height(&selected.summary, fonts.body, frame.width),
                font_size: fonts.body,
                content: selected.summary.clone(),
            })],
            Section::Skills if !selected.skills.is_empty() => vec![ItemDraft::Block(BlockDraft {
                kind: BlockKind::Skills,
                inset: 0.0,
                height: text_height(&selected.skills, fonts.body, frame.width),
                font_size: fonts.body,
                content: selected.skills.clone(),
            })],
            Section::Experience => selected
                .jobs
                .iter()
                .map(|job| ItemDraft::Group(measure_job(job, fitter, fonts, lh, card_width)))
                .collect(),
            Section::Education => selected
                .education
                .iter()
                .map(|edu| {
                    let mut blocks = vec![BlockDraft {
                        kind: BlockKind::EducationEntry,
                        inset: 0.0,
                        height: multiline_height(fitter, &edu.entry, fonts.body, lh, card_width),
                        font_size: fonts.body,
                        content: edu.entry.clone(),
                    }];
                    if let Some(coursework) = &edu.coursework {
                        blocks.push(BlockDraft {
                            kind: BlockKind::Coursework,
                            inset: 0.0,
                            height: text_height(coursework, fonts.small, card_width),
                            font_size: fonts.small,
                            content: coursework.clone(),
                        });
                    }
                    ItemDraft::Group(GroupDraft {
                        kind: ContainerKind::Education,
                        index: edu.index,
                        blocks,
                        trim_record: TrimmedContent::Coursework {
                            institution: edu.institution.clone(),
                        },
                    })
                })
                .collect(),
            _ => Vec::new(),
        };

        if items.is_empty() {
            continue;
        }
        sections.push(SectionDraft {
            section: placement.section,
            frame,
            title: BlockDraft {
                kind: BlockKind::SectionTitle,
                inset: 0.0,
                height: line_box(fonts.title, lh),
                font_size: fonts.title,
                content: placement.section.label().to_string(),
            },
            items,
        });
    }

    Drafts { header, sections }
}

/// Height of `text` whose `\n`-separated lines each wrap on their own.
/// Every line takes at least one line box, and so does the whole text.
fn multiline_height(fitter: &TextFitter, text: &str, size: f32, lh: f32, width: f32) -> f32 {
    let one_line = line_box(size, lh);
    text.lines()
        .map(|line| fitter.estimate_height(line, size, lh, width).max(one_line))
        .sum::<f32>()
        .max(one_line)
}

fn measure_job(
    job: &SelectedJob,
    fitter: &TextFitter,
    fonts: &FontSizes,
    lh: f32,
    card_width: f32,
) -> GroupDraft {
    let body_line = line_box(fonts.body, lh);
    let bullet_width = (card_width - BULLET_INDENT).max(0.0);

    let mut blocks = vec![BlockDraft {
        kind: BlockKind::JobHeader,
        inset: 0.0,
        height: multiline_height(fitter, &job.header, fonts.body, lh, card_width),
        font_size: fonts.body,
        content: job.header.clone(),
    }];

    blocks.extend(job.bullets.iter().map(|bullet| BlockDraft {
        kind: BlockKind::Achievement,
        inset: BULLET_INDENT,
        height: fitter
            .estimate_height(bullet, fonts.body, lh, bullet_width)
            .max(body_line),
        font_size: fonts.body,
        content: bullet.clone(),
    }));

    if !job.technologies.is_empty() {
        let budget = fitter.chars_per_line(fonts.small, card_width);
        blocks.push(BlockDraft {
            kind: BlockKind::JobTags,
            inset: 0.0,
            height: line_box(fonts.small, lh),
            font_size: fonts.small,
            content: truncate(&job.technologies, budget, false),
        });
    }

    GroupDraft {
        kind: ContainerKind::Job,
        index: job.index,
        blocks,
        trim_record: TrimmedContent::Job {
            title: job.title.clone(),
            company: job.company.clone(),
        },
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stacking
// ────────────────────────────────────────────────────────────────────────────

fn place(draft: &BlockDraft, frame: ColumnFrame, padding: f32, y: f32) -> PositionedBlock {
    PositionedBlock {
        kind: draft.kind,
        column: frame.column,
        x: frame.x + padding + draft.inset,
        y,
        width: (frame.width - 2.0 * padding - draft.inset).max(0.0),
        height: draft.height,
        font_size: draft.font_size,
        content: draft.content.clone(),
    }
}

fn stack(drafts: &Drafts, geometry: &Geometry) -> Stacked {
    let full = geometry.full_frame();
    let mut blocks = vec![place(&drafts.header, full, 0.0, 0.0)];
    let mut containers = Vec::new();
    let mut cursors = Cursors {
        main: geometry.header_height,
        side: geometry.header_height,
    };

    for section in &drafts.sections {
        let frame = section.frame;
        let cursor = cursors.at(frame.column);
        let mut y = *cursor + geometry.section_gap;

        blocks.push(place(&section.title, frame, 0.0, y));
        y += section.title.height;

        for (i, item) in section.items.iter().enumerate() {
            if i > 0 {
                y += geometry.entry_gap;
            }
            match item {
                ItemDraft::Block(draft) => {
                    blocks.push(place(draft, frame, 0.0, y));
                    y += draft.height;
                }
                ItemDraft::Group(group) => {
                    let pad = geometry.card_padding;
                    let top = y;
                    let mut inner = top + pad;
                    for draft in &group.blocks {
                        blocks.push(place(draft, frame, pad, inner));
                        inner += draft.height;
                    }
                    let height = inner + pad - top;
                    containers.push(ContainerBox {
                        kind: group.kind,
                        column: frame.column,
                        index: group.index,
                        x: frame.x,
                        y: top,
                        width: frame.width,
                        height,
                    });
                    y = top + height;
                }
            }
        }
        *cursor = y;
    }

    let page_height = cursors.main.max(cursors.side) + geometry.margin;
    Stacked {
        blocks,
        containers,
        main_bottom: cursors.main,
        side_bottom: cursors.side,
        page_height,
    }
}

fn finish(
    config: &TemplateConfig,
    fonts: FontSizes,
    stacked: Stacked,
    rescaled: bool,
    trimmed: Vec<TrimmedContent>,
    overflow: bool,
) -> LayoutPlan {
    LayoutPlan {
        template: config.name.clone(),
        page_width: config.geometry.page_width,
        page_height: stacked.page_height,
        fonts,
        blocks: stacked.blocks,
        containers: stacked.containers,
        rescaled,
        trimmed,
        overflow,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
