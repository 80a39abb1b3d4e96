use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::Context;
use armory_core::{update, AppState, Filters, IconView, ImageStatus, Msg, Surface};
use engine_logging::{engine_debug, engine_info, engine_warn};

use super::config;
use super::effects::EffectRunner;
use super::logging;
use super::ui::render;
use crate::Args;

const TICK: Duration = Duration::from_millis(75);

pub fn run_app(args: Args) -> anyhow::Result<()> {
    logging::initialize(args.log);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_with(&args, &mut out)
}

pub(crate) fn run_with(args: &Args, out: &mut dyn Write) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let file = config::load(args.config.as_deref(), &cwd)?;
    let engine_config =
        config::engine_config(&file, args.site.as_deref()).context("invalid configuration")?;
    let runner = EffectRunner::new(engine_config).context("failed to start engine")?;

    let mut session = Session {
        state: AppState::with_filters(filters_from(args)),
        runner,
    };
    let timeout = Duration::from_secs(args.settle_timeout);

    session.runner.load_catalog();
    session.settle(timeout);

    if let Some(item_id) = args.open {
        session.dispatch(Msg::CardClicked(item_id));
        if session.state.open_item().is_none() {
            engine_warn!("No item with id {}", item_id);
        }
        if let Some(index) = args.skin {
            session.dispatch(Msg::VariantSelected {
                surface: Surface::Modal,
                item_id,
                index,
            });
        }
        session.settle(timeout);
    }

    write_lines(out, &render::render(&session.state.view()))?;
    if args.explain_missing {
        session.explain_missing(out)?;
    }
    out.flush()?;
    Ok(())
}

fn filters_from(args: &Args) -> Filters {
    Filters {
        manufacturer: args.manufacturer.clone().filter(|m| !m.is_empty()),
        category: args.category.clone().filter(|c| !c.is_empty()),
        search: args.search.clone(),
        sort_by: args.sort,
    }
}

fn write_lines(out: &mut dyn Write, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

struct Session {
    state: AppState,
    runner: EffectRunner,
}

impl Session {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (next, effects) = update(state, msg);
        self.state = next;
        self.runner.enqueue(effects);
    }

    /// Pumps engine events until every image has settled or `timeout` passes.
    fn settle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.state.images_settled() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                engine_warn!("Images still loading after {:?}; rendering anyway", timeout);
                return false;
            }
            let msgs = self.runner.poll(TICK.min(deadline - now));
            if msgs.is_empty() {
                self.dispatch(Msg::Tick);
            }
            for msg in msgs {
                self.dispatch(msg);
            }
            if self.state.consume_dirty() {
                let view = self.state.view();
                engine_debug!(
                    "{} of {} card(s) settled",
                    view.cards
                        .iter()
                        .filter(|card| !matches!(
                            card.image.status,
                            ImageStatus::Pending | ImageStatus::Loading
                        ))
                        .count(),
                    view.cards.len()
                );
            }
        }
    }

    /// Shows the hint toast for every missing image and icon in view.
    fn explain_missing(&mut self, out: &mut dyn Write) -> anyhow::Result<()> {
        let view = self.state.view();
        let mut requests = Vec::new();
        for card in &view.cards {
            if card.image.status == ImageStatus::Missing {
                let hint = self.runner.missing_image_hint(&card.name);
                requests.push(Msg::MissingImageClicked {
                    expected: hint.expected,
                    tried: hint.tried,
                });
            }
        }
        if let Some(banner) = view.banner.as_ref().filter(|b| b.icon == IconView::Missing) {
            let hint = self.runner.missing_icon_hint(&banner.manufacturer);
            requests.push(Msg::MissingIconClicked {
                expected: hint.expected,
            });
        }
        if let Some(detail) = &view.detail {
            if detail.image.status == ImageStatus::Missing {
                let hint = self.runner.missing_image_hint(&detail.name);
                requests.push(Msg::MissingImageClicked {
                    expected: hint.expected,
                    tried: hint.tried,
                });
            }
            if detail.manufacturer_icon == IconView::Missing {
                let hint = self.runner.missing_icon_hint(&detail.manufacturer);
                requests.push(Msg::MissingIconClicked {
                    expected: hint.expected,
                });
            }
        }

        engine_info!("Explaining {} missing asset(s)", requests.len());
        for msg in requests {
            self.dispatch(msg);
            if let Some(toast) = self.state.view().toast {
                write_lines(out, &render::toast_lines(&toast))?;
            }
            self.dispatch(Msg::ToastDismissed);
        }
        Ok(())
    }
}
