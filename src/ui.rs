//! The embedded single-page frontend.
//!
//! The browser owns the per-session state: the selected file, the analysis
//! result and the poem. Uploading a new image resets both; a failed
//! analysis disables poem generation; a failed poem generation keeps the
//! analysis visible so generation can simply be retried.

use axum::response::Html;

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Picture Poet</title>
    <style>
        :root {
            --card: 40 40% 98%;
            --card-foreground: 0 12% 21%;
            --primary: 25 45% 35%;
            --accent: 16 60% 45%;
            --muted: 30 10% 45%;
        }

        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }

        body {
            font-family: Georgia, 'Times New Roman', serif;
            background: linear-gradient(160deg, hsl(40 45% 95%) 0%, hsl(28 35% 88%) 100%);
            min-height: 100vh;
            display: flex;
            flex-direction: column;
            align-items: center;
            padding: 32px 16px;
            color: hsl(var(--card-foreground));
        }

        header {
            text-align: center;
            margin-bottom: 28px;
        }

        h1 {
            color: hsl(var(--primary));
            font-size: 2.6em;
            letter-spacing: -0.5px;
        }

        .tagline {
            color: hsl(var(--muted));
            margin-top: 6px;
        }

        main {
            width: 100%;
            max-width: 960px;
            display: grid;
            grid-template-columns: 1fr 1fr;
            gap: 24px;
            align-items: start;
        }

        @media (max-width: 760px) {
            main { grid-template-columns: 1fr; }
        }

        .card {
            background: hsl(var(--card));
            border-radius: 14px;
            box-shadow: 0 10px 30px rgba(60, 47, 47, 0.15);
            padding: 24px;
        }

        .card h2 {
            font-size: 1.2em;
            color: hsl(var(--primary));
            margin-bottom: 14px;
        }

        label {
            display: block;
            font-size: 0.85em;
            color: hsl(var(--muted));
            margin-bottom: 6px;
        }

        select {
            width: 100%;
            padding: 10px;
            border: 1px solid hsl(30 20% 80%);
            border-radius: 8px;
            background: white;
            font-family: inherit;
            font-size: 1em;
            margin-bottom: 16px;
        }

        .upload-area {
            border: 2px dashed hsl(var(--primary) / 0.5);
            border-radius: 10px;
            padding: 40px 16px;
            text-align: center;
            cursor: pointer;
            transition: border-color 0.2s, background 0.2s;
        }

        .upload-area:hover, .upload-area.dragover {
            border-color: hsl(var(--accent));
            background: hsl(40 40% 94%);
        }

        .upload-hint {
            color: hsl(var(--muted));
            font-size: 0.85em;
            margin-top: 8px;
        }

        input[type="file"] { display: none; }

        .preview {
            max-width: 100%;
            border-radius: 10px;
            margin-top: 16px;
            display: none;
        }

        button {
            width: 100%;
            padding: 12px;
            border: none;
            border-radius: 8px;
            background: hsl(var(--accent));
            color: white;
            font-family: inherit;
            font-size: 1em;
            cursor: pointer;
        }

        button:hover:not(:disabled) { filter: brightness(1.08); }

        button:disabled {
            background: hsl(30 15% 70%);
            cursor: not-allowed;
        }

        button.secondary {
            background: transparent;
            border: 1px solid hsl(var(--primary));
            color: hsl(var(--primary));
            margin-top: 12px;
        }

        .insights p { margin: 4px 0; font-size: 0.95em; }
        .insights strong { color: hsl(var(--primary)); }

        .poem {
            white-space: pre-wrap;
            line-height: 1.7;
            font-size: 1.05em;
            padding: 14px;
            background: white;
            border: 1px solid hsl(30 20% 85%);
            border-radius: 8px;
            margin-top: 10px;
        }

        .status {
            color: hsl(var(--muted));
            font-style: italic;
            margin-top: 10px;
            display: none;
        }

        .error {
            background: hsl(0 70% 96%);
            border: 1px solid hsl(0 55% 75%);
            color: hsl(0 55% 35%);
            padding: 12px;
            border-radius: 8px;
            margin-top: 12px;
            display: none;
        }

        .hidden { display: none; }

        footer {
            margin-top: 36px;
            color: hsl(var(--muted));
            font-size: 0.85em;
        }
    </style>
</head>
<body>
    <header>
        <h1>Picture Poet</h1>
        <p class="tagline">Transform your photos into beautiful poetry with AI.</p>
    </header>

    <main>
        <section class="card">
            <h2>Upload Your Photo</h2>
            <label for="language">Language</label>
            <select id="language">
                <option>English</option>
                <option>Spanish</option>
                <option>French</option>
                <option>German</option>
                <option>Italian</option>
                <option>Portuguese</option>
                <option>Japanese</option>
            </select>
            <div class="upload-area" id="uploadArea">
                <div>Drag &amp; drop your photo here, or click to browse</div>
                <div class="upload-hint">JPEG, PNG, WEBP or GIF up to 5MB</div>
                <input type="file" id="fileInput" accept="image/jpeg,image/png,image/webp,image/gif">
            </div>
            <img id="preview" class="preview" alt="Uploaded preview">
            <p class="status" id="analyzeStatus">Analyzing image&hellip;</p>
            <div class="error" id="error"></div>
        </section>

        <section class="card">
            <h2>Craft Your Poem</h2>
            <label for="style">Poetry style</label>
            <select id="style">
                <option>Haiku</option>
                <option>Sonnet</option>
                <option selected>Free Verse</option>
                <option>Limerick</option>
                <option>Ballad</option>
            </select>
            <button id="generateBtn" disabled>Generate Poem</button>

            <div id="insights" class="insights hidden" style="margin-top: 18px;">
                <h2>Image Insights</h2>
                <p><strong>Objects:</strong> <span id="objects"></span></p>
                <p><strong>Themes:</strong> <span id="themes"></span></p>
                <p><strong>Mood:</strong> <span id="mood"></span></p>
            </div>

            <p class="status" id="poemStatus">Generating poem&hellip;</p>

            <div id="poemCard" class="hidden" style="margin-top: 18px;">
                <h2>Your Picture Poem</h2>
                <div class="poem" id="poemText"></div>
                <button class="secondary" id="downloadBtn">Download Artwork</button>
            </div>
        </section>
    </main>

    <footer>Picture Poet &mdash; photos in, poems out.</footer>

    <script>
        const MAX_FILE_SIZE = 5 * 1024 * 1024;
        const ACCEPTED_TYPES = ['image/jpeg', 'image/png', 'image/webp', 'image/gif'];

        const uploadArea = document.getElementById('uploadArea');
        const fileInput = document.getElementById('fileInput');
        const preview = document.getElementById('preview');
        const analyzeStatus = document.getElementById('analyzeStatus');
        const poemStatus = document.getElementById('poemStatus');
        const errorDiv = document.getElementById('error');
        const generateBtn = document.getElementById('generateBtn');
        const downloadBtn = document.getElementById('downloadBtn');
        const insights = document.getElementById('insights');
        const poemCard = document.getElementById('poemCard');

        // Per-session state; a new upload resets everything downstream.
        let currentFile = null;
        let analysis = null;
        let poem = null;

        function showError(message) {
            errorDiv.textContent = message;
            errorDiv.style.display = 'block';
        }

        function clearError() {
            errorDiv.style.display = 'none';
        }

        uploadArea.addEventListener('click', () => fileInput.click());

        uploadArea.addEventListener('dragover', (e) => {
            e.preventDefault();
            uploadArea.classList.add('dragover');
        });

        uploadArea.addEventListener('dragleave', () => {
            uploadArea.classList.remove('dragover');
        });

        uploadArea.addEventListener('drop', (e) => {
            e.preventDefault();
            uploadArea.classList.remove('dragover');
            if (e.dataTransfer.files.length > 0) {
                handleFile(e.dataTransfer.files[0]);
            }
        });

        fileInput.addEventListener('change', (e) => {
            if (e.target.files[0]) {
                handleFile(e.target.files[0]);
            }
        });

        async function handleFile(file) {
            clearError();

            if (!ACCEPTED_TYPES.includes(file.type)) {
                showError('Please upload an image (JPEG, PNG, WEBP, GIF).');
                return;
            }
            if (file.size > MAX_FILE_SIZE) {
                showError('Please upload an image smaller than 5MB.');
                return;
            }

            currentFile = file;
            analysis = null;
            poem = null;
            insights.classList.add('hidden');
            poemCard.classList.add('hidden');
            generateBtn.disabled = true;

            const reader = new FileReader();
            reader.onload = (e) => {
                preview.src = e.target.result;
                preview.style.display = 'block';
            };
            reader.readAsDataURL(file);

            analyzeStatus.style.display = 'block';

            const formData = new FormData();
            formData.append('image', file);
            formData.append('language', document.getElementById('language').value);

            try {
                const response = await fetch('/api/analyze', { method: 'POST', body: formData });
                if (!response.ok) {
                    throw new Error(await response.text());
                }
                analysis = await response.json();

                document.getElementById('objects').textContent =
                    analysis.objects.join(', ') || 'None detected';
                document.getElementById('themes').textContent =
                    analysis.themes.join(', ') || 'None detected';
                document.getElementById('mood').textContent = analysis.mood || 'N/A';
                insights.classList.remove('hidden');
                generateBtn.disabled = false;
            } catch (err) {
                showError('Failed to analyze image: ' + err.message);
            } finally {
                analyzeStatus.style.display = 'none';
            }
        }

        generateBtn.addEventListener('click', async () => {
            if (!currentFile || !analysis) {
                showError('Please upload and analyze an image first.');
                return;
            }
            clearError();
            poem = null;
            poemCard.classList.add('hidden');
            poemStatus.style.display = 'block';
            generateBtn.disabled = true;

            const formData = new FormData();
            formData.append('image', currentFile);
            formData.append('style', document.getElementById('style').value);
            formData.append('language', document.getElementById('language').value);
            formData.append('analysis', analysis.summary);

            try {
                const response = await fetch('/api/poem', { method: 'POST', body: formData });
                if (!response.ok) {
                    throw new Error(await response.text());
                }
                const result = await response.json();
                poem = result.poem;
                document.getElementById('poemText').textContent = poem;
                poemCard.classList.remove('hidden');
            } catch (err) {
                // Analysis stays on screen; generation can simply be retried.
                showError('Failed to generate poem: ' + err.message);
            } finally {
                poemStatus.style.display = 'none';
                generateBtn.disabled = false;
            }
        });

        downloadBtn.addEventListener('click', async () => {
            if (!currentFile || poem === null) {
                return;
            }
            clearError();

            const rootStyle = getComputedStyle(document.documentElement);
            const formData = new FormData();
            formData.append('image', currentFile);
            formData.append('poem', poem);
            formData.append('style', document.getElementById('style').value);
            formData.append('background', rootStyle.getPropertyValue('--card').trim());
            formData.append('foreground', rootStyle.getPropertyValue('--card-foreground').trim());

            try {
                const response = await fetch('/api/artwork', { method: 'POST', body: formData });
                if (!response.ok) {
                    throw new Error(await response.text());
                }

                const disposition = response.headers.get('Content-Disposition') || '';
                const match = disposition.match(/filename="(.+)"/);
                const blob = await response.blob();
                const link = document.createElement('a');
                link.href = URL.createObjectURL(blob);
                link.download = match ? match[1] : 'PicturePoem.png';
                link.click();
                URL.revokeObjectURL(link.href);
            } catch (err) {
                showError('Could not render artwork: ' + err.message);
            }
        });
    </script>
</body>
</html>
"##;
