mod test_relay_forwards_payload;
