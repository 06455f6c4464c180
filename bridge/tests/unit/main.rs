mod fakes;
mod test_mqtt;
mod test_platform;
