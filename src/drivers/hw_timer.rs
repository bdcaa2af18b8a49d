//! Control-loop timer using ESP-IDF's esp_timer API.
//!
//! One periodic timer pushes `Event::ControlTick` into the lock-free queue
//! every `control_loop_interval_ms`.  The callback runs in the esp_timer
//! task (not ISR), and only touches the atomic queue.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::events::{push_event, Event};

#[cfg(target_os = "espidf")]
unsafe extern "C" fn control_tick_cb(_arg: *mut core::ffi::c_void) {
    if !push_event(Event::ControlTick) {
        log::warn!("hw_timer: event queue full, control tick dropped");
    }
}

/// Start the periodic control tick.  The timer runs for the life of the
/// firmware; its handle is never deleted.
#[cfg(target_os = "espidf")]
pub fn start_control_timer(interval_ms: u32) {
    let args = esp_timer_create_args_t {
        callback: Some(control_tick_cb),
        arg: core::ptr::null_mut(),
        dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
        name: c"control".as_ptr(),
        skip_unhandled_events: true,
    };
    let mut handle: esp_timer_handle_t = core::ptr::null_mut();

    // SAFETY: `args` outlives the call; the callback only pushes to the
    // atomic event queue.
    unsafe {
        let ret = esp_timer_create(&args, &mut handle);
        if ret != ESP_OK {
            log::error!("hw_timer: control timer create failed (rc={ret})");
            return;
        }
        let ret = esp_timer_start_periodic(handle, u64::from(interval_ms) * 1_000);
        if ret != ESP_OK {
            log::error!("hw_timer: control timer start failed (rc={ret})");
            esp_timer_delete(handle);
            return;
        }
    }
    info!("hw_timer: control tick every {interval_ms}ms");
}

#[cfg(not(target_os = "espidf"))]
pub fn start_control_timer(interval_ms: u32) {
    log::info!("hw_timer(sim): control timer not started ({interval_ms}ms)");
}
