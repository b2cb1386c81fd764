#![forbid(unsafe_code)]

//! The page model: every controller of the portfolio page behind one
//! [`Model`] implementation.

use core::time::Duration;

use tracing::{debug, warn};

use crate::config::{ConfigError, PageConfig};
use crate::contact::{ContactFields, ContactForm, SENT_MESSAGE};
use crate::effect::{Class, Display, Effect, Target};
use crate::event::{KeyInput, PageEvent};
use crate::filter::PortfolioFilter;
use crate::loading::LoadingScreen;
use crate::markup::{Layout, Markup, MarkupError};
use crate::nav::Navigation;
use crate::notify::{NotificationId, NotificationKind, NotificationPhase, Notifications};
use crate::program::{Cmd, Model, RuntimeError};
use crate::reveal::RevealSet;
use crate::scroll::{anchor_target, parallax_offset};

/// Errors raised while building a [`PageModel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    Markup(MarkupError),
    Config(ConfigError),
    Runtime(RuntimeError),
}

impl core::fmt::Display for PageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Markup(e) => write!(f, "{e}"),
            Self::Config(e) => write!(f, "{e}"),
            Self::Runtime(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Markup(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Runtime(e) => Some(e),
        }
    }
}

impl From<MarkupError> for PageError {
    fn from(e: MarkupError) -> Self {
        Self::Markup(e)
    }
}

impl From<ConfigError> for PageError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<RuntimeError> for PageError {
    fn from(e: RuntimeError) -> Self {
        Self::Runtime(e)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageMsg {
    Event(PageEvent),
    LoadingFade,
    LoadingDone,
    ItemsShown,
    ItemHidden(usize),
    SubmitDone,
    Notify(NotificationKind, String),
    NotificationEnter(NotificationId),
    NotificationExit(NotificationId),
    NotificationRemove(NotificationId),
}

impl From<PageEvent> for PageMsg {
    fn from(event: PageEvent) -> Self {
        Self::Event(event)
    }
}

#[derive(Debug, Clone)]
pub struct PageModel {
    config: PageConfig,
    /// Section ids declared by the template.
    sections: Vec<String>,
    layout: Layout,
    has_hero: bool,
    focusable_count: usize,
    loading: LoadingScreen,
    nav: Navigation,
    reveal: RevealSet,
    filter: PortfolioFilter,
    contact: ContactForm,
    notifications: Notifications,
    focused: Option<usize>,
    scroll_y: f64,
}

impl PageModel {
    pub fn new(markup: Markup, config: PageConfig) -> Result<Self, PageError> {
        markup.validate()?;
        config.validate()?;
        let Markup {
            nav_links,
            sections,
            fade_in_count,
            filter_buttons,
            portfolio_items,
            submit_label,
            has_hero,
            focusable_count,
            active_filter,
            active_nav_link,
        } = markup;
        Ok(Self {
            nav: Navigation::new(
                nav_links,
                active_nav_link,
                config.navbar_scrolled_px,
                config.section_lookahead_px,
            ),
            reveal: RevealSet::new(fade_in_count),
            filter: PortfolioFilter::new(filter_buttons, portfolio_items, active_filter),
            contact: ContactForm::new(submit_label),
            sections,
            layout: Layout::default(),
            has_hero,
            focusable_count,
            loading: LoadingScreen::new(),
            notifications: Notifications::new(),
            focused: None,
            scroll_y: 0.0,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    #[must_use]
    pub fn loading(&self) -> &LoadingScreen {
        &self.loading
    }

    #[must_use]
    pub fn nav(&self) -> &Navigation {
        &self.nav
    }

    #[must_use]
    pub fn reveal(&self) -> &RevealSet {
        &self.reveal
    }

    #[must_use]
    pub fn filter(&self) -> &PortfolioFilter {
        &self.filter
    }

    #[must_use]
    pub fn contact(&self) -> &ContactForm {
        &self.contact
    }

    #[must_use]
    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    #[must_use]
    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    #[must_use]
    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    fn handle_event(&mut self, event: PageEvent) -> Cmd<PageMsg> {
        match event {
            PageEvent::Loaded => {
                if !self.loading.loaded() {
                    return Cmd::none();
                }
                Cmd::after(Self::ms(self.config.loading_delay_ms), PageMsg::LoadingFade)
            }
            PageEvent::Layout { layout } => {
                match layout.check(&self.sections) {
                    Ok(()) => self.layout = layout,
                    Err(err) => warn!(%err, "layout measurement rejected"),
                }
                Cmd::none()
            }
            PageEvent::Scroll { y } => self.on_scroll(y),
            PageEvent::HamburgerClick => Cmd::effects(self.nav.toggle_menu()),
            PageEvent::NavLinkClick { index } => {
                let mut cmds = vec![Cmd::effects(self.nav.close_menu())];
                if let Some(href) = self.nav.link_href(index).map(str::to_owned) {
                    cmds.push(self.scroll_to_anchor(&href));
                }
                Cmd::batch(cmds)
            }
            PageEvent::AnchorClick { href } => self.scroll_to_anchor(&href),
            PageEvent::Key(key) => self.on_key(&key),
            PageEvent::Intersection {
                index,
                intersecting,
            } => Cmd::effects(self.reveal.observe(index, intersecting)),
            PageEvent::FilterClick { index } => self.on_filter(index),
            PageEvent::ContactSubmit { fields } => self.on_submit(&fields),
            PageEvent::Focus { index, focused } => self.on_focus(index, focused),
        }
    }

    fn on_scroll(&mut self, y: f64) -> Cmd<PageMsg> {
        self.scroll_y = y;
        let mut effects = self.nav.on_scroll(y, &self.layout);
        if self.has_hero {
            effects.push(Effect::SetTranslateY {
                target: Target::Hero,
                px: parallax_offset(y, self.config.parallax_rate),
            });
        }
        Cmd::effects(effects)
    }

    fn scroll_to_anchor(&self, href: &str) -> Cmd<PageMsg> {
        match anchor_target(&self.layout, href) {
            Some(top) => {
                debug!(href, top, "smooth scroll");
                Cmd::Effect(Effect::ScrollTo { top, smooth: true })
            }
            None => Cmd::none(),
        }
    }

    fn on_key(&mut self, key: &KeyInput) -> Cmd<PageMsg> {
        if key.is_escape() {
            Cmd::effects(self.nav.close_menu())
        } else {
            Cmd::none()
        }
    }

    fn on_filter(&mut self, index: usize) -> Cmd<PageMsg> {
        let Some(outcome) = self.filter.select(index) else {
            debug!(button = index, "click on unknown filter button");
            return Cmd::none();
        };
        let mut cmds = vec![Cmd::effects(outcome.effects)];
        if outcome.needs_frame {
            cmds.push(Cmd::NextFrame(PageMsg::ItemsShown));
        }
        let delay = self.config.filter_hide();
        cmds.extend(
            outcome
                .hide_after_delay
                .into_iter()
                .map(|item| Cmd::after(delay, PageMsg::ItemHidden(item))),
        );
        Cmd::batch(cmds)
    }

    fn on_submit(&mut self, fields: &ContactFields) -> Cmd<PageMsg> {
        if let Err(err) = fields.validate() {
            debug!(%err, "contact form rejected");
            return Self::notify(NotificationKind::Error, err.to_string());
        }
        if !self.contact.begin() {
            warn!("contact form submitted while a send is pending");
            return Cmd::none();
        }
        Cmd::batch(vec![
            Cmd::Effect(Effect::SetText {
                target: Target::SubmitButton,
                text: self.config.sending_label.clone(),
            }),
            Cmd::Effect(Effect::SetDisabled {
                target: Target::SubmitButton,
                disabled: true,
            }),
            Cmd::after(self.config.submit_latency(), PageMsg::SubmitDone),
        ])
    }

    fn on_submit_done(&mut self) -> Cmd<PageMsg> {
        self.contact.finish();
        Cmd::batch(vec![
            Self::notify(NotificationKind::Success, SENT_MESSAGE.to_string()),
            Cmd::Effect(Effect::ResetForm),
            Cmd::Effect(Effect::SetText {
                target: Target::SubmitButton,
                text: self.contact.label().to_string(),
            }),
            Cmd::Effect(Effect::SetDisabled {
                target: Target::SubmitButton,
                disabled: false,
            }),
        ])
    }

    fn on_focus(&mut self, index: usize, focused: bool) -> Cmd<PageMsg> {
        if index >= self.focusable_count {
            return Cmd::none();
        }
        if focused {
            self.focused = Some(index);
        } else if self.focused == Some(index) {
            self.focused = None;
        }
        Cmd::Effect(Effect::SetOutline {
            target: Target::Focusable(index),
            on: focused,
        })
    }

    fn notify(kind: NotificationKind, message: String) -> Cmd<PageMsg> {
        Cmd::Msg(PageMsg::Notify(kind, message))
    }

    fn on_notify(&mut self, kind: NotificationKind, message: String) -> Cmd<PageMsg> {
        let id = self.notifications.create(kind, message.clone());
        let cfg = &self.config;
        Cmd::batch(vec![
            Cmd::Effect(Effect::ShowNotification { id, kind, message }),
            Cmd::after(
                Self::ms(cfg.notification_enter_ms),
                PageMsg::NotificationEnter(id),
            ),
            Cmd::after(
                Self::ms(cfg.notification_hold_ms),
                PageMsg::NotificationExit(id),
            ),
        ])
    }
}

impl Model for PageModel {
    type Message = PageMsg;

    fn update(&mut self, msg: PageMsg) -> Cmd<PageMsg> {
        match msg {
            PageMsg::Event(event) => self.handle_event(event),
            PageMsg::LoadingFade => {
                if !self.loading.start_fade() {
                    return Cmd::none();
                }
                Cmd::batch(vec![
                    Cmd::Effect(Effect::class(Target::LoadingScreen, Class::FadeOut, true)),
                    Cmd::after(Self::ms(self.config.loading_fade_ms), PageMsg::LoadingDone),
                ])
            }
            PageMsg::LoadingDone => {
                if !self.loading.finish() {
                    return Cmd::none();
                }
                Cmd::Effect(Effect::display(Target::LoadingScreen, Display::None))
            }
            PageMsg::ItemsShown => Cmd::effects(self.filter.finish_showing()),
            PageMsg::ItemHidden(item) => Cmd::effects(self.filter.finish_hiding(item)),
            PageMsg::SubmitDone => self.on_submit_done(),
            PageMsg::Notify(kind, message) => self.on_notify(kind, message),
            PageMsg::NotificationEnter(id) => {
                // An exit that already started wins over a late enter.
                let entering = self
                    .notifications
                    .get(id)
                    .is_some_and(|n| n.phase == NotificationPhase::Entering);
                if !entering {
                    return Cmd::none();
                }
                self.notifications.set_phase(id, NotificationPhase::Shown);
                Cmd::Effect(Effect::SlideNotification { id, shown: true })
            }
            PageMsg::NotificationExit(id) => {
                if !self.notifications.set_phase(id, NotificationPhase::Leaving) {
                    return Cmd::none();
                }
                Cmd::batch(vec![
                    Cmd::Effect(Effect::SlideNotification { id, shown: false }),
                    Cmd::after(
                        Self::ms(self.config.notification_exit_ms),
                        PageMsg::NotificationRemove(id),
                    ),
                ])
            }
            PageMsg::NotificationRemove(id) => match self.notifications.remove(id) {
                Some(_) => Cmd::Effect(Effect::RemoveNotification { id }),
                None => Cmd::none(),
            },
        }
    }
}
