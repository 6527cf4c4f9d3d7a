//! Page-side entry point
//!
//! Loaded into the page's isolated world by `agent-loader.js`. The active
//! agent and its listeners live in a page-scoped slot; installing again or
//! removing drops the previous listeners before anything new is attached.

use std::cell::RefCell;
use std::rc::Rc;

use gb_core::{ExtensionConfig, OverlayAgent, PageEvent, PageScript, remove_overlay};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Element, Event, EventTarget};

use crate::chrome;
use crate::logging;
use crate::page::WebPage;

type SharedAgent = Rc<RefCell<OverlayAgent<WebPage>>>;

/// A registered listener, unregistered on drop
struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

struct ActiveAgent {
    agent: SharedAgent,
    _listeners: Vec<Listener>,
}

thread_local! {
    static ACTIVE: RefCell<Option<ActiveAgent>> = const { RefCell::new(None) };
}

fn listen(
    target: &EventTarget,
    event: &'static str,
    passive: bool,
    mut handler: impl FnMut(Event) + 'static,
) -> Result<Listener, JsValue> {
    let callback = Closure::<dyn FnMut(Event)>::new(move |e: Event| handler(e));
    let options = AddEventListenerOptions::new();
    options.set_passive(passive);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        event,
        callback.as_ref().unchecked_ref(),
        &options,
    )?;
    Ok(Listener {
        target: target.clone(),
        event,
        callback,
    })
}

fn forward(agent: &SharedAgent, event: PageEvent<Element>) {
    // A listener can fire while another handler holds the agent; drop the event then.
    if let Ok(mut agent) = agent.try_borrow_mut() {
        agent.handle(event);
    }
}

fn install(verbose: bool) -> Result<(), JsValue> {
    logging::init(ExtensionConfig::agent_log_filter(verbose));
    tracing::info!("Script injection started");

    ACTIVE.with(|slot| slot.borrow_mut().take());

    let page = WebPage::current().map_err(chrome::js_error)?;
    let document: EventTarget = page.document().clone().into();
    let window: EventTarget = page.window().clone().into();
    let agent: SharedAgent = Rc::new(RefCell::new(
        OverlayAgent::install(page).map_err(chrome::js_error)?,
    ));

    let mut listeners = Vec::with_capacity(4);
    let a = agent.clone();
    listeners.push(listen(&document, "mouseover", false, move |e| {
        if let Some(element) = e.target().and_then(|t| t.dyn_into::<Element>().ok()) {
            forward(&a, PageEvent::PointerEnter(element));
        }
    })?);
    let a = agent.clone();
    listeners.push(listen(&document, "mouseout", false, move |_| {
        forward(&a, PageEvent::PointerLeave)
    })?);
    let a = agent.clone();
    listeners.push(listen(&window, "scroll", true, move |_| {
        forward(&a, PageEvent::Scroll)
    })?);
    let a = agent.clone();
    listeners.push(listen(&window, "resize", true, move |_| {
        forward(&a, PageEvent::Resize)
    })?);

    ACTIVE.with(|slot| {
        *slot.borrow_mut() = Some(ActiveAgent {
            agent,
            _listeners: listeners,
        })
    });
    tracing::info!("Script injection completed successfully");
    Ok(())
}

fn remove() -> Result<(), JsValue> {
    if let Some(active) = ACTIVE.with(|slot| slot.borrow_mut().take()) {
        tracing::debug!(phase = ?active.agent.borrow().phase(), "Dropping overlay agent");
    }
    let page = WebPage::current().map_err(chrome::js_error)?;
    remove_overlay(&page);
    Ok(())
}

/// Run a named page script; called by the function injected from the popup
#[wasm_bindgen(js_name = runPageScript)]
pub fn run_page_script(script: &str, verbose: bool) -> Result<(), JsValue> {
    let result = match PageScript::from_name(script, verbose) {
        Some(PageScript::InstallOverlay { verbose }) => install(verbose),
        Some(PageScript::RemoveOverlay) => remove(),
        None => Err(chrome::js_error(format!("unknown page script '{script}'"))),
    };
    if let Err(e) = &result {
        tracing::error!("Error in injected script: {}", chrome::error_message(e));
    }
    result
}
