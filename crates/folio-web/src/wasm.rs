#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use folio_core::notify::NotificationId;
use folio_core::{
    Class, Effect, KeyInput, Layout, Markup, PageEvent, PageModel, PageRuntime, SectionLayout,
    Target, start_page,
};
use js_sys::{Array, Function};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, EventTarget, HtmlElement, HtmlFormElement, HtmlInputElement,
    HtmlTextAreaElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, KeyboardEvent, ScrollBehavior, ScrollToOptions, Window,
};

use crate::contract::{
    ANCHOR_SELECTOR, CATEGORY_ATTR, CONTACT_FORM_ID, FADE_IN_SELECTOR, FIELD_NAMES,
    FILTER_ATTR, FILTER_BUTTON_SELECTOR, FOCUS_OUTLINE, FOCUS_OUTLINE_OFFSET, FOCUSABLE_SELECTOR,
    HAMBURGER_ID, HERO_SELECTOR, LOADING_SCREEN_ID, NAV_LINK_SELECTOR, NAV_MENU_ID, NAVBAR_ID,
    PORTFOLIO_ITEM_SELECTOR, SECTION_SELECTOR, SUBMIT_BUTTON_SELECTOR, notification_class,
    notification_css, notification_transform, parse_options, translate_y,
};

type Listener = Closure<dyn FnMut(web_sys::Event)>;

fn js_err(msg: impl core::fmt::Display) -> JsValue {
    JsValue::from_str(&msg.to_string())
}

fn query_all<T: JsCast>(root: &Document, selector: &str) -> Result<Vec<T>, JsValue> {
    let list = root.query_selector_all(selector)?;
    Ok((0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<T>().ok())
        .collect())
}

fn required(document: &Document, id: &str) -> Result<HtmlElement, JsValue> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .ok_or_else(|| js_err(format!("missing required element #{id}")))
}

/// Elements of the page template, indexed like the markup snapshot.
struct Dom {
    window: Window,
    document: Document,
    loading_screen: HtmlElement,
    navbar: HtmlElement,
    hamburger: HtmlElement,
    nav_menu: HtmlElement,
    nav_links: Vec<HtmlElement>,
    sections: Vec<(String, HtmlElement)>,
    fade_ins: Vec<Element>,
    filter_buttons: Vec<HtmlElement>,
    portfolio_items: Vec<HtmlElement>,
    form: HtmlFormElement,
    submit: HtmlElement,
    hero: Option<HtmlElement>,
    anchors: Vec<HtmlElement>,
    /// Non-section elements named by same-page links.
    anchor_targets: Vec<(String, HtmlElement)>,
    focusables: Vec<HtmlElement>,
    notifications: HashMap<NotificationId, HtmlElement>,
}

impl Dom {
    fn scan(window: Window) -> Result<Self, JsValue> {
        let document = window
            .document()
            .ok_or_else(|| js_err("window has no document"))?;
        let form = required(&document, CONTACT_FORM_ID)?
            .dyn_into::<HtmlFormElement>()
            .map_err(|_| js_err(format!("#{CONTACT_FORM_ID} is not a form")))?;
        let submit = form
            .query_selector(SUBMIT_BUTTON_SELECTOR)?
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .ok_or_else(|| js_err(format!("missing {SUBMIT_BUTTON_SELECTOR} in contact form")))?;
        let sections: Vec<(String, HtmlElement)> = query_all::<HtmlElement>(&document, SECTION_SELECTOR)?
            .into_iter()
            .filter(|s| !s.id().is_empty())
            .map(|s| (s.id(), s))
            .collect();
        let hero = document
            .query_selector(HERO_SELECTOR)?
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        let nav_links: Vec<HtmlElement> = query_all(&document, NAV_LINK_SELECTOR)?;
        let anchors: Vec<HtmlElement> = query_all(&document, ANCHOR_SELECTOR)?;
        let anchor_targets = fragment_targets(&document, &sections, nav_links.iter().chain(&anchors));

        Ok(Self {
            loading_screen: required(&document, LOADING_SCREEN_ID)?,
            navbar: required(&document, NAVBAR_ID)?,
            hamburger: required(&document, HAMBURGER_ID)?,
            nav_menu: required(&document, NAV_MENU_ID)?,
            nav_links,
            sections,
            fade_ins: query_all(&document, FADE_IN_SELECTOR)?,
            filter_buttons: query_all(&document, FILTER_BUTTON_SELECTOR)?,
            portfolio_items: query_all(&document, PORTFOLIO_ITEM_SELECTOR)?,
            form,
            submit,
            hero,
            anchors,
            anchor_targets,
            focusables: query_all(&document, FOCUSABLE_SELECTOR)?,
            notifications: HashMap::new(),
            window,
            document,
        })
    }

    fn markup(&self) -> Markup {
        Markup {
            nav_links: self
                .nav_links
                .iter()
                .map(|l| l.get_attribute("href").unwrap_or_default())
                .collect(),
            sections: self.sections.iter().map(|(id, _)| id.clone()).collect(),
            fade_in_count: self.fade_ins.len(),
            filter_buttons: self
                .filter_buttons
                .iter()
                .map(|b| b.get_attribute(FILTER_ATTR).unwrap_or_default())
                .collect(),
            portfolio_items: self
                .portfolio_items
                .iter()
                .map(|i| i.get_attribute(CATEGORY_ATTR).unwrap_or_default())
                .collect(),
            submit_label: self.submit.text_content().unwrap_or_default(),
            has_hero: self.hero.is_some(),
            focusable_count: self.focusables.len(),
            active_filter: self.filter_buttons.iter().position(is_marked_active),
            active_nav_link: self.nav_links.iter().position(is_marked_active),
        }
    }

    fn measure(&self) -> Layout {
        let at = |(id, el): &(String, HtmlElement)| SectionLayout {
            id: id.clone(),
            top: f64::from(el.offset_top()),
        };
        Layout {
            sections: self.sections.iter().map(at).collect(),
            anchors: self.anchor_targets.iter().map(at).collect(),
            navbar_height: f64::from(self.navbar.offset_height()),
        }
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn field_value(&self, name: &str) -> String {
        let Ok(Some(field)) = self.form.query_selector(&format!("[name=\"{name}\"]")) else {
            return String::new();
        };
        if let Some(input) = field.dyn_ref::<HtmlInputElement>() {
            return input.value();
        }
        field
            .dyn_ref::<HtmlTextAreaElement>()
            .map(HtmlTextAreaElement::value)
            .unwrap_or_default()
    }

    fn contact_fields(&self) -> folio_core::contact::ContactFields {
        let [name, email, subject, message] = FIELD_NAMES.map(|f| self.field_value(f));
        folio_core::contact::ContactFields {
            name,
            email,
            subject,
            message,
        }
    }

    fn target(&self, target: Target) -> Option<&HtmlElement> {
        match target {
            Target::LoadingScreen => Some(&self.loading_screen),
            Target::Navbar => Some(&self.navbar),
            Target::Hamburger => Some(&self.hamburger),
            Target::NavMenu => Some(&self.nav_menu),
            Target::NavLink(i) => self.nav_links.get(i),
            Target::FadeIn(i) => self.fade_ins.get(i).and_then(|el| el.dyn_ref()),
            Target::FilterButton(i) => self.filter_buttons.get(i),
            Target::PortfolioItem(i) => self.portfolio_items.get(i),
            Target::SubmitButton => Some(&self.submit),
            Target::Hero => self.hero.as_ref(),
            Target::Focusable(i) => self.focusables.get(i),
            Target::Notification(id) => self.notifications.get(&id),
        }
    }

    fn apply(&mut self, effect: Effect) -> Result<(), JsValue> {
        match effect {
            Effect::SetClass { target, class, on } => {
                if let Some(el) = self.target(target) {
                    el.class_list().toggle_with_force(class.as_str(), on)?;
                }
            }
            Effect::SetDisplay { target, display } => {
                if let Some(el) = self.target(target) {
                    el.style().set_property("display", display.as_css())?;
                }
            }
            Effect::SetText { target, text } => {
                if let Some(el) = self.target(target) {
                    el.set_text_content(Some(&text));
                }
            }
            Effect::SetDisabled { target, disabled } => {
                if let Some(el) = self.target(target) {
                    el.toggle_attribute_with_force("disabled", disabled)?;
                }
            }
            Effect::ResetForm => self.form.reset(),
            Effect::ScrollTo { top, smooth } => {
                let options = ScrollToOptions::new();
                options.set_top(top);
                if smooth {
                    options.set_behavior(ScrollBehavior::Smooth);
                }
                self.window.scroll_to_with_scroll_to_options(&options);
            }
            Effect::SetTranslateY { target, px } => {
                if let Some(el) = self.target(target) {
                    el.style().set_property("transform", &translate_y(px))?;
                }
            }
            Effect::SetOutline { target, on } => {
                if let Some(el) = self.target(target) {
                    let style = el.style();
                    if on {
                        style.set_property("outline", FOCUS_OUTLINE)?;
                        style.set_property("outline-offset", FOCUS_OUTLINE_OFFSET)?;
                    } else {
                        style.remove_property("outline")?;
                        style.remove_property("outline-offset")?;
                    }
                }
            }
            Effect::ShowNotification { id, kind, message } => {
                let el = self
                    .document
                    .create_element("div")?
                    .dyn_into::<HtmlElement>()?;
                el.set_class_name(&notification_class(kind));
                el.set_text_content(Some(&message));
                el.style().set_css_text(&notification_css(kind));
                if let Some(body) = self.document.body() {
                    body.append_child(&el)?;
                }
                self.notifications.insert(id, el);
            }
            Effect::SlideNotification { id, shown } => {
                if let Some(el) = self.notifications.get(&id) {
                    el.style()
                        .set_property("transform", notification_transform(shown))?;
                }
            }
            Effect::RemoveNotification { id } => {
                if let Some(el) = self.notifications.remove(&id) {
                    el.remove();
                }
            }
        }
        Ok(())
    }
}

struct Host {
    dom: Dom,
    runtime: PageRuntime<PageModel>,
    origin_ms: f64,
    timer_armed: Option<Duration>,
    frame_armed: bool,
}

impl Host {
    fn now(&self) -> Duration {
        let now_ms = self
            .dom
            .window
            .performance()
            .map_or(self.origin_ms, |p| p.now());
        Duration::from_secs_f64(((now_ms - self.origin_ms) / 1000.0).max(0.0))
    }

    fn feed(&mut self, event: PageEvent) {
        let name = event.name();
        if let Err(err) = self.runtime.push_event(event) {
            warn!(%err, event = name, "page event rejected");
        }
    }

    /// Push a fresh geometry measurement ahead of an event that reads it.
    fn remeasure(&mut self) {
        let layout = self.dom.measure();
        self.feed(PageEvent::Layout { layout });
    }

    fn flush(&mut self) {
        for effect in self.runtime.take_outputs().effects {
            if let Err(err) = self.dom.apply(effect) {
                warn!(error = ?err, "failed to apply page effect");
            }
        }
    }
}

/// Run `f` against the host, then apply effects and rearm callbacks.
fn with_host(host: &Rc<RefCell<Host>>, f: impl FnOnce(&mut Host)) {
    let Ok(mut h) = host.try_borrow_mut() else {
        warn!("page host busy; dropping reentrant callback");
        return;
    };
    let now = h.now();
    h.runtime.advance_to(now);
    f(&mut *h);
    h.flush();
    drop(h);
    arm(host);
}

fn push(host: &Rc<RefCell<Host>>, event: PageEvent) {
    with_host(host, |h| h.feed(event));
}

/// Like [`push`], but measures the page first so scroll targets reflect the
/// current layout.
fn push_measured(host: &Rc<RefCell<Host>>, event: PageEvent) {
    with_host(host, |h| {
        h.remeasure();
        h.feed(event);
    });
}

fn is_marked_active(el: &HtmlElement) -> bool {
    el.class_list().contains(Class::Active.as_str())
}

/// Resolve the fragment of every same-page link that does not name a
/// section. Ids without an element stay unresolved.
fn fragment_targets<'a>(
    document: &Document,
    sections: &[(String, HtmlElement)],
    links: impl Iterator<Item = &'a HtmlElement>,
) -> Vec<(String, HtmlElement)> {
    let mut seen: HashSet<String> = sections.iter().map(|(id, _)| id.clone()).collect();
    let mut targets = Vec::new();
    for link in links {
        let Some(href) = link.get_attribute("href") else {
            continue;
        };
        let Some(id) = href.strip_prefix('#').filter(|id| !id.is_empty()) else {
            continue;
        };
        if !seen.insert(id.to_string()) {
            continue;
        }
        if let Some(el) = document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        {
            targets.push((id.to_string(), el));
        }
    }
    targets
}

/// Schedule the next timer pump and animation frame the runtime needs.
fn arm(host: &Rc<RefCell<Host>>) {
    let Ok(mut h) = host.try_borrow_mut() else {
        return;
    };

    if h.runtime.has_pending_frame() && !h.frame_armed {
        let weak = Rc::downgrade(host);
        let callback = Closure::once_into_js(move || {
            if let Some(host) = weak.upgrade() {
                with_host(&host, |h| {
                    h.frame_armed = false;
                    h.runtime.frame();
                });
            }
        });
        match h.dom.window.request_animation_frame(callback.unchecked_ref()) {
            Ok(_) => h.frame_armed = true,
            Err(err) => warn!(error = ?err, "requestAnimationFrame failed"),
        }
    }

    let Some(deadline) = h.runtime.next_deadline() else {
        return;
    };
    if h.timer_armed.is_some_and(|armed| armed <= deadline) {
        return;
    }
    let delay_ms = deadline.saturating_sub(h.now()).as_micros().div_ceil(1000);
    let weak = Rc::downgrade(host);
    let callback = Closure::once_into_js(move || {
        if let Some(host) = weak.upgrade() {
            // Cleared unconditionally so an early wakeup rearms the rest.
            with_host(&host, |h| h.timer_armed = None);
        }
    });
    let callback: &Function = callback.unchecked_ref();
    let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
    match h
        .dom
        .window
        .set_timeout_with_callback_and_timeout_and_arguments_0(callback, delay)
    {
        Ok(_) => h.timer_armed = Some(deadline),
        Err(err) => warn!(error = ?err, "setTimeout failed"),
    }
}

/// Web/WASM page controller.
///
/// Owns the page runtime, the DOM bindings, and every registered listener.
#[wasm_bindgen]
pub struct FolioWeb {
    host: Option<Rc<RefCell<Host>>>,
    listeners: Vec<(EventTarget, &'static str, Listener)>,
    observer: Option<(IntersectionObserver, Closure<dyn FnMut(Array, IntersectionObserver)>)>,
    options: Option<String>,
}

#[wasm_bindgen]
impl FolioWeb {
    /// `options` is an optional plain object overriding page timings.
    #[wasm_bindgen(constructor)]
    pub fn new(options: Option<js_sys::Object>) -> Result<FolioWeb, JsValue> {
        let options = match options {
            Some(obj) => Some(String::from(js_sys::JSON::stringify(&obj)?)),
            None => None,
        };
        // Fail fast on bad options rather than at start().
        parse_options(options.as_deref()).map_err(js_err)?;
        Ok(Self {
            host: None,
            listeners: Vec::new(),
            observer: None,
            options,
        })
    }

    /// Scan the document, register listeners, and start the page.
    pub fn start(&mut self) -> Result<(), JsValue> {
        if self.host.is_some() {
            return Err(js_err("page already started"));
        }
        let config = parse_options(self.options.as_deref()).map_err(js_err)?;
        let window = web_sys::window().ok_or_else(|| js_err("no window"))?;
        let dom = Dom::scan(window)?;
        let reveal_margin = config.reveal_root_margin();
        let reveal_threshold = config.reveal_threshold;
        let mut runtime = start_page(dom.markup(), config).map_err(js_err)?;
        runtime
            .push_event(PageEvent::Layout {
                layout: dom.measure(),
            })
            .map_err(js_err)?;
        let origin_ms = dom.window.performance().map_or(0.0, |p| p.now());
        let already_loaded = dom.document.ready_state() == "complete";

        let host = Rc::new(RefCell::new(Host {
            dom,
            runtime,
            origin_ms,
            timer_armed: None,
            frame_armed: false,
        }));
        self.host = Some(Rc::clone(&host));

        self.register_listeners(&host)?;
        self.observe_fade_ins(&host, reveal_threshold, &reveal_margin)?;

        if already_loaded {
            push_measured(&host, PageEvent::Loaded);
        }
        debug!("folio page started");
        Ok(())
    }

    /// Fire due timers now. Hosts with their own loop may call this instead
    /// of relying on the internal `setTimeout` pump.
    pub fn pump(&self) {
        if let Some(host) = &self.host {
            with_host(host, |_| {});
        }
    }

    /// Feed a recorded event (JSON, see `PageEvent`).
    #[wasm_bindgen(js_name = replayEvent)]
    pub fn replay_event(&self, json: &str) -> Result<(), JsValue> {
        let event = PageEvent::from_json_str(json).map_err(js_err)?;
        let host = self.host.as_ref().ok_or_else(|| js_err("page not started"))?;
        push(host, event);
        Ok(())
    }

    /// Remove every listener and release the DOM.
    pub fn destroy(&mut self) {
        for (target, kind, listener) in self.listeners.drain(..) {
            if let Err(err) =
                target.remove_event_listener_with_callback(kind, listener.as_ref().unchecked_ref())
            {
                warn!(error = ?err, kind, "failed to remove listener");
            }
        }
        if let Some((observer, _callback)) = self.observer.take() {
            observer.disconnect();
        }
        self.host = None;
    }
}

impl FolioWeb {
    fn listen(
        &mut self,
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) -> Result<(), JsValue> {
        let listener: Listener =
            Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
        target.add_event_listener_with_callback(kind, listener.as_ref().unchecked_ref())?;
        self.listeners.push((target.clone(), kind, listener));
        Ok(())
    }

    fn register_listeners(&mut self, host: &Rc<RefCell<Host>>) -> Result<(), JsValue> {
        let (window, hamburger, form, nav_links, filter_buttons, anchors, focusables) = {
            let h = host.borrow();
            let d = &h.dom;
            (
                d.window.clone(),
                d.hamburger.clone(),
                d.form.clone(),
                d.nav_links.clone(),
                d.filter_buttons.clone(),
                d.anchors.clone(),
                d.focusables.clone(),
            )
        };
        let document = host.borrow().dom.document.clone();

        let hst = Rc::clone(host);
        // Images and fonts shift sections once the page finishes loading.
        self.listen(&window, "load", move |_| push_measured(&hst, PageEvent::Loaded))?;

        let hst = Rc::clone(host);
        self.listen(&window, "scroll", move |_| {
            with_host(&hst, |h| {
                h.remeasure();
                let y = h.dom.scroll_y();
                h.feed(PageEvent::Scroll { y });
            });
        })?;

        let hst = Rc::clone(host);
        self.listen(&window, "resize", move |_| {
            with_host(&hst, Host::remeasure);
        })?;

        let hst = Rc::clone(host);
        self.listen(&hamburger, "click", move |_| {
            push(&hst, PageEvent::HamburgerClick);
        })?;

        for (index, link) in nav_links.iter().enumerate() {
            let hst = Rc::clone(host);
            let same_page = link
                .get_attribute("href")
                .is_some_and(|href| href.starts_with('#'));
            self.listen(link, "click", move |event| {
                if same_page {
                    event.prevent_default();
                }
                push_measured(&hst, PageEvent::NavLinkClick { index });
            })?;
        }

        for anchor in &anchors {
            let hst = Rc::clone(host);
            let href = anchor.get_attribute("href").unwrap_or_default();
            self.listen(anchor, "click", move |event| {
                event.prevent_default();
                push_measured(&hst, PageEvent::AnchorClick { href: href.clone() });
            })?;
        }

        let hst = Rc::clone(host);
        self.listen(&document, "keydown", move |event| {
            let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            push(&hst, PageEvent::Key(KeyInput { key: key.key() }));
        })?;

        for (index, button) in filter_buttons.iter().enumerate() {
            let hst = Rc::clone(host);
            self.listen(button, "click", move |_| {
                push(&hst, PageEvent::FilterClick { index });
            })?;
        }

        let hst = Rc::clone(host);
        self.listen(&form, "submit", move |event| {
            event.prevent_default();
            with_host(&hst, |h| {
                let fields = h.dom.contact_fields();
                h.feed(PageEvent::ContactSubmit { fields });
            });
        })?;

        for (index, el) in focusables.iter().enumerate() {
            for (kind, focused) in [("focus", true), ("blur", false)] {
                let hst = Rc::clone(host);
                self.listen(el, kind, move |_| {
                    push(&hst, PageEvent::Focus { index, focused });
                })?;
            }
        }
        Ok(())
    }

    fn observe_fade_ins(
        &mut self,
        host: &Rc<RefCell<Host>>,
        threshold: f64,
        root_margin: &str,
    ) -> Result<(), JsValue> {
        let fade_ins = host.borrow().dom.fade_ins.clone();
        if fade_ins.is_empty() {
            return Ok(());
        }
        let hst = Rc::clone(host);
        let targets = fade_ins.clone();
        let callback: Closure<dyn FnMut(Array, IntersectionObserver)> =
            Closure::wrap(Box::new(move |entries: Array, _observer| {
                with_host(&hst, |h| {
                    for entry in entries.iter() {
                        let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                            continue;
                        };
                        let target = entry.target();
                        if let Some(index) = targets.iter().position(|el| *el == target) {
                            h.feed(PageEvent::Intersection {
                                index,
                                intersecting: entry.is_intersecting(),
                            });
                        }
                    }
                });
            }) as Box<dyn FnMut(Array, IntersectionObserver)>);

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(threshold));
        init.set_root_margin(root_margin);
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        for el in &fade_ins {
            observer.observe(el);
        }
        self.observer = Some((observer, callback));
        Ok(())
    }
}

/// Installs the panic hook when the feature is enabled.
#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}
