//! End-to-end tests for the LED frame relay over loopback UDP.

#[cfg(test)]
mod harness;

#[cfg(test)]
mod loopback_e2e;

#[cfg(test)]
mod shutdown;
