//! Browser component
//!
//! Mounts a [`VideoPlayer`] into a container element: a wrapper `div` holding
//! the `video` surface Plyr enhances. Right-clicks on the wrapper open the
//! context menu; the menu itself is drawn by the host page from the view
//! passed to the `onMenuChange` callback.

use crate::plyr::{to_js, PlyrFactory};
use crate::warn;
use std::cell::RefCell;
use std::rc::Rc;
use tube_player_core::player::SURFACE_CLASS;
use tube_player_core::{
    ContextMenuEvent, MenuAction, PlaybackControl, VideoPlayer, VideoPlayerProps,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, HtmlVideoElement, MouseEvent};

type MenuCallback = Rc<RefCell<Option<js_sys::Function>>>;

fn js_error(e: tube_player_core::Error) -> JsValue {
    js_sys::Error::new(&format!("[{}] {}", e.error_code(), e)).into()
}

/// Render the player and publish the menu view
fn render_player(
    player: &RefCell<VideoPlayer>,
    wrapper: &HtmlElement,
    on_menu: &MenuCallback,
) -> Result<JsValue, JsValue> {
    let view = player.borrow_mut().render().map_err(js_error)?;
    wrapper.set_class_name(&view.wrapper_class);

    let menu = to_js(&view.menu).map_err(js_error)?;
    if let Some(callback) = on_menu.borrow().as_ref() {
        callback.call1(&JsValue::NULL, &menu)?;
    }
    to_js(&view).map_err(js_error)
}

/// Video player mounted in the DOM
#[wasm_bindgen]
pub struct TubePlayer {
    player: Rc<RefCell<VideoPlayer>>,
    wrapper: HtmlElement,
    on_menu: MenuCallback,
    on_context_menu: Closure<dyn FnMut(MouseEvent)>,
}

#[wasm_bindgen]
impl TubePlayer {
    /// Mount a player inside `container` using the given props object
    #[wasm_bindgen(constructor)]
    pub fn new(container: &HtmlElement, props: JsValue) -> Result<TubePlayer, JsValue> {
        let props: VideoPlayerProps = serde_wasm_bindgen::from_value(props)?;
        let document = container
            .owner_document()
            .ok_or_else(|| JsValue::from_str("container has no document"))?;

        let wrapper: HtmlElement = document.create_element("div")?.dyn_into()?;
        let video: HtmlVideoElement = document.create_element("video")?.dyn_into()?;
        video.set_class_name(SURFACE_CLASS);
        wrapper.append_child(&video)?;
        container.append_child(&wrapper)?;

        let player = Rc::new(RefCell::new(VideoPlayer::new(props, PlyrFactory::new(video))));
        let on_menu: MenuCallback = Rc::new(RefCell::new(None));

        let on_context_menu = {
            let player = Rc::downgrade(&player);
            let wrapper = wrapper.clone();
            let on_menu = on_menu.clone();
            Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
                let Some(player) = player.upgrade() else {
                    return;
                };

                let mut menu_event =
                    ContextMenuEvent::new(f64::from(event.page_x()), f64::from(event.page_y()));
                player.borrow_mut().on_context_menu(&mut menu_event);
                if menu_event.is_default_prevented() {
                    event.prevent_default();
                }

                if let Err(e) = render_player(&player, &wrapper, &on_menu) {
                    warn(&format!("Render after right-click failed: {:?}", e));
                }
            })
        };
        wrapper.add_event_listener_with_callback(
            "contextmenu",
            on_context_menu.as_ref().unchecked_ref(),
        )?;

        let component = TubePlayer {
            player,
            wrapper,
            on_menu,
            on_context_menu,
        };
        component.render()?;
        Ok(component)
    }

    /// Player identifier used in logs
    pub fn id(&self) -> String {
        self.player.borrow().id().to_string()
    }

    /// Re-render with the current props and return the view
    pub fn render(&self) -> Result<JsValue, JsValue> {
        render_player(&self.player, &self.wrapper, &self.on_menu)
    }

    /// Replace the props and re-render
    #[wasm_bindgen(js_name = setProps)]
    pub fn set_props(&self, props: JsValue) -> Result<JsValue, JsValue> {
        let props: VideoPlayerProps = serde_wasm_bindgen::from_value(props)?;
        self.player.borrow_mut().set_props(props);
        self.render()
    }

    /// Register the callback that receives the menu view (or `null`)
    #[wasm_bindgen(js_name = onMenuChange)]
    pub fn on_menu_change(&self, callback: js_sys::Function) {
        *self.on_menu.borrow_mut() = Some(callback);
    }

    /// Dismiss the context menu
    #[wasm_bindgen(js_name = hideMenu)]
    pub fn hide_menu(&self) -> Result<JsValue, JsValue> {
        self.player.borrow_mut().hide_context_menu();
        self.render()
    }

    /// Run a menu action such as `{ action: "set_speed", value: 1.5 }`
    #[wasm_bindgen(js_name = selectMenuAction)]
    pub fn select_menu_action(&self, action: JsValue) -> Result<JsValue, JsValue> {
        let action: MenuAction = serde_wasm_bindgen::from_value(action)?;
        self.player
            .borrow_mut()
            .select_menu_action(action)
            .map_err(js_error)?;
        self.render()
    }

    /// Playback position of the mounted engine
    #[wasm_bindgen(js_name = currentTime)]
    pub fn current_time(&self) -> Result<f64, JsValue> {
        self.player
            .borrow()
            .handle()
            .read(|control| control.current_time())
            .map_err(js_error)
    }

    /// Tear the player down and remove it from the DOM
    pub fn unmount(&self) -> Result<(), JsValue> {
        let _ = self.wrapper.remove_event_listener_with_callback(
            "contextmenu",
            self.on_context_menu.as_ref().unchecked_ref(),
        );
        self.player.borrow_mut().unmount().map_err(js_error)?;
        self.wrapper.remove();
        Ok(())
    }
}

impl Drop for TubePlayer {
    fn drop(&mut self) {
        if self.player.borrow().adapter().is_mounted() {
            if let Err(e) = self.unmount() {
                warn(&format!("Unmount on drop failed: {:?}", e));
            }
        }
    }
}
