mod mock_decoder;
