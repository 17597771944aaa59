pub mod channel_tick_scheduler;
